#![forbid(unsafe_code)]

pub mod markdown;
pub mod tags;

pub mod ids {
    /// File key of an NPC document: `npcs/<slug>.json`.
    ///
    /// Derivation lowercases, maps spaces and underscores to hyphens and drops every
    /// character that is neither alphanumeric nor a hyphen. Two names that differ only in
    /// case or punctuation land on the same slug; upserts rely on that.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct NpcSlug(String);

    impl NpcSlug {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn derive(id_or_name: &str) -> Result<Self, SlugError> {
            let slug = id_or_name
                .to_lowercase()
                .chars()
                .map(|ch| if matches!(ch, ' ' | '_') { '-' } else { ch })
                .filter(|ch| ch.is_alphanumeric() || *ch == '-')
                .collect::<String>();
            if slug.is_empty() {
                return Err(SlugError::Empty);
            }
            Ok(Self(slug))
        }

        pub fn file_name(&self) -> String {
            format!("{}.json", self.0)
        }
    }

    impl std::fmt::Display for NpcSlug {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum SlugError {
        Empty,
    }

    impl SlugError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "slug is empty after removing unsupported characters",
            }
        }
    }

    impl std::fmt::Display for SlugError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for SlugError {}

    /// Title slug used for proposal file names.
    ///
    /// ASCII word characters survive, runs of whitespace/underscore/hyphen collapse into a
    /// single hyphen, everything else is dropped, and edge hyphens are trimmed.
    pub fn title_slug(text: &str) -> String {
        let mut out = String::new();
        let mut pending_sep = false;
        for ch in text.trim().to_lowercase().chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('-');
                }
                pending_sep = false;
                out.push(ch);
            } else if ch.is_whitespace() || ch == '_' || ch == '-' {
                pending_sep = true;
            }
        }
        out
    }
}

pub mod model {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ParseEnumError {
        pub field: &'static str,
        pub value: String,
        pub allowed: &'static [&'static str],
    }

    impl std::fmt::Display for ParseEnumError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(
                f,
                "invalid {} '{}' (expected one of: {})",
                self.field,
                self.value,
                self.allowed.join(", ")
            )
        }
    }

    impl std::error::Error for ParseEnumError {}

    macro_rules! closed_set {
        (
            $(#[$meta:meta])*
            $name:ident, $field:literal {
                $($variant:ident => $label:literal),+ $(,)?
            }
        ) => {
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
            #[serde(rename_all = "lowercase")]
            pub enum $name {
                $($variant),+
            }

            impl $name {
                pub const ALL: &'static [&'static str] = &[$($label),+];

                pub fn as_str(self) -> &'static str {
                    match self {
                        $(Self::$variant => $label),+
                    }
                }

                pub fn parse(value: &str) -> Result<Self, ParseEnumError> {
                    match value.trim() {
                        $($label => Ok(Self::$variant),)+
                        _ => Err(ParseEnumError {
                            field: $field,
                            value: value.to_string(),
                            allowed: Self::ALL,
                        }),
                    }
                }
            }

            impl std::str::FromStr for $name {
                type Err = ParseEnumError;

                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    Self::parse(value)
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        };
    }

    closed_set! {
        /// How badly a rule issue blocks play.
        Severity, "severity" {
            Note => "note",
            Low => "low",
            Med => "med",
            High => "high",
            Blocking => "blocking",
        }
    }

    closed_set! {
        /// Where a rule issue was captured from.
        IssueSource, "issue source" {
            Voice => "voice",
            Hotkey => "hotkey",
            Oracle => "oracle",
            Manual => "manual",
        }
    }

    closed_set! {
        EventType, "event type" {
            Scene => "scene",
            Roll => "roll",
            Ruling => "ruling",
            Lore => "lore",
            Npc => "npc",
            Item => "item",
            System => "system",
            Meta => "meta",
        }
    }

    closed_set! {
        EventSource, "event source" {
            Companion => "companion",
            Oracle => "oracle",
            Player => "player",
            System => "system",
        }
    }

    closed_set! {
        /// `staging` parks a section whose anchor is missing; `direct` fails instead.
        ApplyMode, "mode" {
            Staging => "staging",
            Direct => "direct",
        }
    }

    impl Default for IssueSource {
        fn default() -> Self {
            Self::Manual
        }
    }

    impl Default for ApplyMode {
        fn default() -> Self {
            Self::Staging
        }
    }
}
