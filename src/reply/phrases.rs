use std::fmt;
use std::str::FromStr;

pub const HAPPY_MARKER: &str = "\u{1F600}";
pub const SAD_MARKER: &str = "\u{1F61E}";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Self::En),
            "ja" | "ja-jp" | "japanese" => Ok(Self::Ja),
            _ => Err(format!("Unsupported locale: {s}")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Ja => write!(f, "ja"),
        }
    }
}

/// User-facing wording of every reply the bot sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrases {
    locale: Locale,
}

impl Phrases {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn recognized(&self, accepted: usize, total: usize, displayed: usize) -> String {
        let hidden = total > displayed;
        match self.locale {
            Locale::En => {
                let count = format!("{accepted} {} recognized", faces_word(accepted));
                if hidden {
                    format!("Out of {total}, {count}{HAPPY_MARKER}")
                } else {
                    format!("{count}{HAPPY_MARKER}")
                }
            }
            Locale::Ja => {
                let count = format!("{accepted}件の顔を識別しました{HAPPY_MARKER}");
                if hidden {
                    format!("{total}件中 {count}")
                } else {
                    count
                }
            }
        }
    }

    pub fn unrecognized(&self, total: usize) -> String {
        match self.locale {
            Locale::En => format!(
                "{total} {} detected, but none match a known identity{SAD_MARKER}",
                faces_word(total)
            ),
            Locale::Ja => {
                format!("{total}件の顔を検出しましたが、識別対象の人物ではなさそうです{SAD_MARKER}")
            }
        }
    }

    pub fn no_face(&self) -> String {
        match self.locale {
            Locale::En => format!("No face could be detected{SAD_MARKER}"),
            Locale::Ja => format!("顔を検出できませんでした{SAD_MARKER}"),
        }
    }

    pub fn details(&self) -> &'static str {
        match self.locale {
            Locale::En => "Details",
            Locale::Ja => "くわしく",
        }
    }

    pub fn correct(&self) -> &'static str {
        match self.locale {
            Locale::En => "Correct",
            Locale::Ja => "あってる",
        }
    }

    pub fn wrong(&self) -> &'static str {
        match self.locale {
            Locale::En => "That's wrong",
            Locale::Ja => "やっぱ違うわ",
        }
    }

    pub fn view(&self) -> &'static str {
        match self.locale {
            Locale::En => "View",
            Locale::Ja => "確認する",
        }
    }

    pub fn ok(&self) -> &'static str {
        "OK"
    }

    pub fn accepted(&self, subject_id: u64) -> String {
        match self.locale {
            Locale::En => format!("Updated id:{subject_id}!"),
            Locale::Ja => format!("id:{subject_id} を更新しました！"),
        }
    }

    pub fn rejected(&self, subject_id: u64) -> String {
        match self.locale {
            Locale::En => format!("Marked id:{subject_id} as not matching."),
            Locale::Ja => format!("id:{subject_id} を違う人として記録しました"),
        }
    }
}

fn faces_word(n: usize) -> &'static str {
    if n == 1 {
        "face"
    } else {
        "faces"
    }
}
