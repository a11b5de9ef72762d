/// An addressable bot chat, as snapshotted into a mailing job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub chat_id: i64,
    pub display: String,
}

impl Recipient {
    pub fn new(chat_id: i64, display: impl Into<String>) -> Self {
        Self {
            chat_id,
            display: display.into(),
        }
    }
}

/// Falls back from `@username` through name parts to a placeholder.
pub fn display_name(
    username: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> String {
    if let Some(username) = username {
        return format!("@{}", username);
    }
    let name = [first_name, last_name]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_wins_over_names() {
        assert_eq!(display_name(Some("bob"), Some("Robert"), None), "@bob");
    }

    #[test]
    fn names_join_when_no_username() {
        assert_eq!(display_name(None, Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(display_name(None, None, None), "Unknown");
    }
}
