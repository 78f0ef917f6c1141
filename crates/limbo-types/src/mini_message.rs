use crate::TextComponent;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiniMessageError {
    #[error("Malformed markup: {0}")]
    Markup(#[from] quick_xml::Error),
}

const COLORS: [&str; 16] = [
    "black",
    "dark_blue",
    "dark_green",
    "dark_aqua",
    "dark_red",
    "dark_purple",
    "gold",
    "gray",
    "dark_gray",
    "blue",
    "green",
    "aqua",
    "red",
    "light_purple",
    "yellow",
    "white",
];

#[derive(Debug, Default, Clone)]
struct Style {
    color: Option<String>,
    bold: bool,
    italic: bool,
    underlined: bool,
    strikethrough: bool,
    obfuscated: bool,
}

impl Style {
    /// The style a tag opens on top of this one, or `None` for tags that
    /// carry no styling.
    fn apply(&self, tag: &str) -> Option<Style> {
        let mut next = self.clone();
        match tag {
            "bold" | "b" => next.bold = true,
            "italic" | "i" | "em" => next.italic = true,
            "underlined" | "u" => next.underlined = true,
            "strikethrough" | "st" => next.strikethrough = true,
            "obfuscated" | "obf" => next.obfuscated = true,
            color if COLORS.contains(&color) => next.color = Some(color.to_string()),
            _ => return None,
        }
        Some(next)
    }

    fn component(&self, text: impl Into<String>) -> TextComponent {
        let flag = |set: bool| set.then_some(true);
        TextComponent {
            color: self.color.clone(),
            bold: flag(self.bold),
            italic: flag(self.italic),
            underlined: flag(self.underlined),
            strikethrough: flag(self.strikethrough),
            obfuscated: flag(self.obfuscated),
            ..TextComponent::plain(text)
        }
    }
}

fn tag_name(tag: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(tag.name().as_ref()).into_owned()
}

/// Parse MiniMessage-style markup (`<red>`, `<bold>`, `<newline>` and so
/// on) into a component whose `extra` holds one flat, fully styled child per
/// run of text.
///
/// Closing tags pop the innermost style whatever their name, and unclosed
/// tags run to the end of the input. Unknown tags are dropped but the text
/// inside them is kept.
pub fn parse_mini_message(input: &str) -> Result<TextComponent, MiniMessageError> {
    let wrapped = format!("<root>{}</root>", input);
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().check_end_names = false;

    let mut parts = Vec::new();
    let mut stack = vec![Style::default()];
    // Whether each open tag pushed a style, so unknown tags do not pop one.
    let mut opened: Vec<bool> = Vec::new();

    loop {
        let current = stack.last().cloned().unwrap_or_default();
        match reader.read_event()? {
            Event::Start(tag) => {
                let name = tag_name(&tag);
                if name == "newline" {
                    parts.push(current.component("\n"));
                } else if let Some(style) = current.apply(&name) {
                    stack.push(style);
                    opened.push(true);
                } else {
                    opened.push(false);
                }
            }
            Event::Empty(tag) => {
                if tag_name(&tag) == "newline" {
                    parts.push(current.component("\n"));
                }
            }
            Event::End(_) => {
                if opened.pop() == Some(true) && stack.len() > 1 {
                    stack.pop();
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if !text.is_empty() {
                    parts.push(current.component(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut root = TextComponent::plain("");
    root.extra = parts;
    Ok(root)
}
