use fleetdesk::features::wizard::{FocusTarget, Key, KeyEvent, Modifiers};
use std::fmt;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Key(KeyEvent),
    Focus(FocusTarget),
    Express(bool),
    Repeat(bool),
    Customer(String),
    Save,
    Discard,
    Submit,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type `help` for commands)", self.0)
    }
}

pub(crate) const HELP: &str = "\
commands:
  enter | esc            press a key (prefix with ctrl+, alt+, cmd+ or shift+)
  focus <target>         document | element | input | textarea | editable
  express on|off         toggle express mode
  repeat on|off          toggle repeat booking
  customer <name>        set the customer on the draft
  save | discard         write or delete the draft now
  submit | status | quit";

impl Command {
    pub(crate) fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match head.to_ascii_lowercase().as_str() {
            "" => Err(ParseError("empty input".to_owned())),
            "focus" => parse_focus(rest).map(Self::Focus),
            "express" => parse_switch(rest).map(Self::Express),
            "repeat" => parse_switch(rest).map(Self::Repeat),
            "customer" if !rest.is_empty() => Ok(Self::Customer(rest.to_owned())),
            "customer" => Err(ParseError("customer needs a name".to_owned())),
            "save" => Ok(Self::Save),
            "discard" => Ok(Self::Discard),
            "submit" => Ok(Self::Submit),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            chord => parse_chord(chord).map(Self::Key),
        }
    }
}

fn parse_switch(value: &str) -> Result<bool, ParseError> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(ParseError(format!("expected on|off, got {other:?}"))),
    }
}

fn parse_focus(value: &str) -> Result<FocusTarget, ParseError> {
    match value {
        "document" | "body" => Ok(FocusTarget::Document),
        "element" | "button" => Ok(FocusTarget::Element),
        "input" => Ok(FocusTarget::TextInput),
        "textarea" => Ok(FocusTarget::TextArea),
        "editable" | "contenteditable" => Ok(FocusTarget::ContentEditable),
        other => Err(ParseError(format!("unknown focus target {other:?}"))),
    }
}

fn parse_chord(chord: &str) -> Result<KeyEvent, ParseError> {
    let mut modifiers = Modifiers::NONE;
    let mut parts = chord.split('+').peekable();
    let mut key = None;

    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            key = Some(Key::from(part));
            break;
        }
        match part {
            "ctrl" | "control" => modifiers.ctrl = true,
            "alt" | "option" => modifiers.alt = true,
            "cmd" | "meta" | "super" => modifiers.meta = true,
            "shift" => modifiers.shift = true,
            other => return Err(ParseError(format!("unknown modifier {other:?}"))),
        }
    }

    match key {
        Some(key @ (Key::Enter | Key::Escape)) => Ok(KeyEvent::new(key).with_modifiers(modifiers)),
        _ => Err(ParseError(format!("unknown command {chord:?}"))),
    }
}
