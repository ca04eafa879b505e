use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use quick_xml::events::{BytesStart, Event};

use crate::errors::Result;

/// Trait of documents that consist of text lines.
pub trait Page {
    /// Gets the identifier of the page.
    fn id(&self) -> &str;

    /// Gets the text lines in reading order.
    fn lines(&self) -> &[String];

    /// Gets the entire text of the page.
    fn text(&self) -> String;
}

/// Page read from a PageXML document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageXml {
    id: String,
    lines: Vec<String>,
    line_separator: String,
}

impl PageXml {
    /// Creates a page from text lines.
    pub fn new<S>(id: S, lines: Vec<String>) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            lines,
            line_separator: "\n".to_string(),
        }
    }

    /// Sets the separator used to join lines in [`Page::text()`].
    pub fn line_separator<S>(mut self, separator: S) -> Self
    where
        S: Into<String>,
    {
        self.line_separator = separator.into();
        self
    }

    /// Reads a PageXML file.
    ///
    /// The file stem is used as the identifier if the document does not declare one.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not well-formed XML, an error variant will be returned.
    pub fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        info!("Reading PageXML file {path:?}.");
        let rdr = BufReader::new(File::open(path)?);
        let default_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_reader(rdr, default_id)
    }

    /// Reads a PageXML document.
    ///
    /// Each `TextLine` contributes the text of its own first `TextEquiv/Unicode` element;
    /// word- and glyph-level text is ignored. Lines without such an element are skipped; an
    /// empty element gives an empty line.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    /// * `default_id` - The identifier used if the document does not declare one.
    pub fn from_reader<R>(rdr: R, default_id: String) -> Result<Self>
    where
        R: BufRead,
    {
        let mut rdr = quick_xml::Reader::from_reader(rdr);
        let mut buf = vec![];
        let mut stack: Vec<Vec<u8>> = vec![];
        let mut pcgts_id = None;
        let mut image_filename = None;
        let mut lines = vec![];
        let mut line: Option<String> = None;
        let mut text = String::new();
        loop {
            buf.clear();
            match rdr.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    match e.local_name().as_ref() {
                        b"PcGts" => pcgts_id = attribute(&e, b"pcGtsId")?,
                        b"Page" => image_filename = attribute(&e, b"imageFilename")?,
                        b"TextLine" => line = None,
                        _ => {}
                    }
                    stack.push(e.local_name().as_ref().to_vec());
                    text.clear();
                }
                Event::Empty(e) => {
                    match e.local_name().as_ref() {
                        b"PcGts" => pcgts_id = attribute(&e, b"pcGtsId")?,
                        b"Page" => image_filename = attribute(&e, b"imageFilename")?,
                        b"Unicode" if line.is_none() && is_line_text(&stack) => {
                            line = Some(String::new());
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    text.push_str(&e.unescape()?);
                }
                Event::CData(e) => {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
                Event::End(e) => {
                    stack.pop();
                    match e.local_name().as_ref() {
                        b"Unicode" if line.is_none() && is_line_text(&stack) => {
                            line = Some(std::mem::take(&mut text));
                        }
                        b"TextLine" => {
                            if let Some(l) = line.take() {
                                lines.push(l);
                            }
                        }
                        _ => {}
                    }
                    text.clear();
                }
                Event::Eof => break,
                _ => {}
            }
        }
        let id = pcgts_id.or(image_filename).unwrap_or(default_id);
        Ok(Self::new(id, lines))
    }
}

/// Checks that the parents of a `Unicode` element are `TextLine/TextEquiv`.
fn is_line_text(stack: &[Vec<u8>]) -> bool {
    matches!(stack, [.., a, b] if a == b"TextLine" && b == b"TextEquiv")
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

impl Page for PageXml {
    fn id(&self) -> &str {
        &self.id
    }

    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn text(&self) -> String {
        self.lines.join(&self.line_separator)
    }
}
