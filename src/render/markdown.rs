//! Line-oriented subset of markdown used by assistant replies.
//!
//! Every input line becomes exactly one [`Block`]; inline markup such as
//! `**bold**` is kept verbatim.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        text: String,
    },
    ListItem(String),
    Blank,
    Paragraph(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

pub fn parse_line(line: &str) -> Block {
    if let Some(text) = line.strip_prefix("### ") {
        return Block::Heading { level: 3, text: text.to_string() };
    }
    if let Some(text) = line.strip_prefix("## ") {
        return Block::Heading { level: 2, text: text.to_string() };
    }
    if let Some(text) = line.strip_prefix("# ") {
        return Block::Heading { level: 1, text: text.to_string() };
    }
    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::ListItem(text.to_string());
    }
    if line.trim().is_empty() {
        return Block::Blank;
    }
    Block::Paragraph(line.to_string())
}

pub fn parse(content: &str) -> Document {
    Document {
        blocks: content.split('\n').map(parse_line).collect(),
    }
}
