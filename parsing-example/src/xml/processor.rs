use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receives the structure of a document as the parser recognizes it.
///
/// Every method has an empty default, so a processor only implements the
/// events it cares about.
pub trait XmlProcessor {
    fn start_document(&mut self) {}
    fn end_document(&mut self) {}
    fn begin_start_tag(&mut self, _name: &str) {}
    fn add_attribute(&mut self, _name: &str, _value: &str) {}
    fn end_start_tag(&mut self) {}
    fn end_tag(&mut self, _name: &str) {}
    fn text(&mut self, _text: &str) {}
    fn comment(&mut self, _text: &str) {}
    fn processing_instruction(&mut self, _target: &str, _data: &str) {}
}

/// Shared handle to the processor of one parse.
pub type SharedProcessor = Rc<RefCell<dyn XmlProcessor>>;

/// The attribute value type of the XML grammar: rules either carry the
/// processor down as an inherited attribute or synthesize text.
#[derive(Clone)]
pub enum XmlValue {
    Processor(SharedProcessor),
    Text(String),
}

impl XmlValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            XmlValue::Text(text) => Some(text),
            XmlValue::Processor(_) => None,
        }
    }
}

impl fmt::Debug for XmlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlValue::Processor(_) => f.write_str("Processor"),
            XmlValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartDocument,
    EndDocument,
    BeginStartTag(String),
    Attribute(String, String),
    EndStartTag,
    EndTag(String),
    Text(String),
    Comment(String),
    ProcessingInstruction(String, String),
}

impl fmt::Display for XmlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlEvent::StartDocument => f.write_str("start document"),
            XmlEvent::EndDocument => f.write_str("end document"),
            XmlEvent::BeginStartTag(name) => write!(f, "<{name}"),
            XmlEvent::Attribute(name, value) => write!(f, "  {name}={value:?}"),
            XmlEvent::EndStartTag => f.write_str(">"),
            XmlEvent::EndTag(name) => write!(f, "</{name}>"),
            XmlEvent::Text(text) => write!(f, "text {text:?}"),
            XmlEvent::Comment(text) => write!(f, "comment {text:?}"),
            XmlEvent::ProcessingInstruction(target, data) => write!(f, "pi {target} {data:?}"),
        }
    }
}

/// Records every event. Adjacent text (character data, references and
/// CDATA sections) is merged into one `Text` event.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<XmlEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<XmlEvent> {
        self.events
    }
}

impl XmlProcessor for EventRecorder {
    fn start_document(&mut self) {
        self.events.push(XmlEvent::StartDocument);
    }

    fn end_document(&mut self) {
        self.events.push(XmlEvent::EndDocument);
    }

    fn begin_start_tag(&mut self, name: &str) {
        self.events.push(XmlEvent::BeginStartTag(name.to_string()));
    }

    fn add_attribute(&mut self, name: &str, value: &str) {
        self.events
            .push(XmlEvent::Attribute(name.to_string(), value.to_string()));
    }

    fn end_start_tag(&mut self) {
        self.events.push(XmlEvent::EndStartTag);
    }

    fn end_tag(&mut self, name: &str) {
        self.events.push(XmlEvent::EndTag(name.to_string()));
    }

    fn text(&mut self, text: &str) {
        if let Some(XmlEvent::Text(last)) = self.events.last_mut() {
            last.push_str(text);
        } else {
            self.events.push(XmlEvent::Text(text.to_string()));
        }
    }

    fn comment(&mut self, text: &str) {
        self.events.push(XmlEvent::Comment(text.to_string()));
    }

    fn processing_instruction(&mut self, target: &str, data: &str) {
        self.events.push(XmlEvent::ProcessingInstruction(
            target.to_string(),
            data.to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_merges_text() {
        let mut recorder = EventRecorder::new();
        recorder.text("a ");
        recorder.text("&");
        recorder.end_tag("p");
        recorder.text("b");
        assert_eq!(
            recorder.into_events(),
            vec![
                XmlEvent::Text("a &".into()),
                XmlEvent::EndTag("p".into()),
                XmlEvent::Text("b".into()),
            ]
        );
    }
}
