/// Leica `.xlif` scan description reader
///
/// Only the first image of the document is read:
/// `<root>/<first element>/Data/<first child>`. Below it two parts matter:
/// - the `TileScanInfo` attachment, one `Tile` element per scanned field
/// - `ImageDescription/Dimensions`, where DimID 1 is X and DimID 2 is Y
///
/// Everything else (channels, instrument settings, other images) is skipped.
/// The text encoding comes from the BOM or the XML declaration.

use quick_xml::encoding::{decode, detect_encoding};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;
use std::str::FromStr;

use crate::error::MetadataError;
use crate::grid::{Axis, AxisDescriptor};

/// One `Tile` element, in document order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRecord {
    pub field_x: i32,
    pub field_y: i32,
    pub pos_x: f64,
    pub pos_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanDescription {
    pub tiles: Vec<TileRecord>,
    pub axis_x: AxisDescriptor,
    pub axis_y: AxisDescriptor,
}

/// Parse a raw scan description. `source` is only used for error messages.
pub fn parse(document: &[u8], source: &Path) -> Result<ScanDescription, MetadataError> {
    let malformed = |message: String| MetadataError::Malformed {
        path: source.to_path_buf(),
        message,
    };

    // UTF-16 is transcoded up front; ASCII-compatible encodings are decoded
    // per attribute by the reader
    let transcoded;
    let mut reader = match detect_encoding(document) {
        Some((encoding, bom)) if !encoding.is_ascii_compatible() => {
            transcoded = decode(&document[bom..], encoding)
                .map_err(|e| malformed(format!("not valid {}: {e}", encoding.name())))?;
            Reader::from_str(&transcoded)
        }
        Some((_, bom)) => Reader::from_reader(&document[bom..]),
        None => Reader::from_reader(document),
    };
    let mut collector = Collector::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let scope = collector.element(&e, &reader)?;
                collector.open.push(scope);
            }
            Ok(Event::Empty(e)) => {
                collector.element(&e, &reader)?;
            }
            Ok(Event::End(_)) => {
                collector
                    .open
                    .pop()
                    .ok_or_else(|| malformed("unbalanced closing tag".to_string()))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !collector.open.is_empty() {
        return Err(malformed("document ends inside an open element".to_string()));
    }

    Ok(ScanDescription {
        tiles: collector.tiles,
        axis_x: collector.axis_x.ok_or(MetadataError::MissingAxis(Axis::X))?,
        axis_y: collector.axis_y.ok_or(MetadataError::MissingAxis(Axis::Y))?,
    })
}

/// What an open element is, relative to the image being read
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Root,
    Element,
    Data,
    Image,
    TileScan,
    Description,
    Dimensions,
    Other,
}

/// Accumulates records while walking the event stream
#[derive(Default)]
struct Collector {
    tiles: Vec<TileRecord>,
    axis_x: Option<AxisDescriptor>,
    axis_y: Option<AxisDescriptor>,
    /// Scopes of the currently open elements, outermost first
    open: Vec<Scope>,
    element_seen: bool,
    data_seen: bool,
    image_seen: bool,
    dimensions_seen: bool,
}

impl Collector {
    /// Handle a start or empty element and return its scope
    fn element<B>(&mut self, e: &BytesStart, reader: &Reader<B>) -> Result<Scope, MetadataError> {
        let name = e.name();
        let scope = match self.open.last().copied() {
            None => Scope::Root,
            Some(Scope::Root) if !self.element_seen => {
                self.element_seen = true;
                Scope::Element
            }
            Some(Scope::Element) if name.as_ref() == b"Data" && !self.data_seen => {
                self.data_seen = true;
                Scope::Data
            }
            Some(Scope::Data) if !self.image_seen => {
                self.image_seen = true;
                Scope::Image
            }
            Some(Scope::Image) => {
                if attribute(e, "Name", reader)?.as_deref() == Some("TileScanInfo") {
                    Scope::TileScan
                } else if name.as_ref() == b"ImageDescription" {
                    self.dimensions_seen = false;
                    Scope::Description
                } else {
                    Scope::Other
                }
            }
            Some(Scope::TileScan) => {
                if name.as_ref() == b"Tile" {
                    self.tile(e, reader)?;
                }
                Scope::Other
            }
            Some(Scope::Description) if name.as_ref() == b"Dimensions" && !self.dimensions_seen => {
                self.dimensions_seen = true;
                Scope::Dimensions
            }
            Some(Scope::Dimensions) => {
                self.dimension(e, reader)?;
                Scope::Other
            }
            Some(_) => Scope::Other,
        };
        Ok(scope)
    }

    fn tile<B>(&mut self, e: &BytesStart, reader: &Reader<B>) -> Result<(), MetadataError> {
        let index = self.tiles.len();
        let required = |name: &'static str| -> Result<String, MetadataError> {
            attribute(e, name, reader)?.ok_or(MetadataError::MissingTileAttribute {
                index,
                attribute: name,
            })
        };

        let record = TileRecord {
            field_x: number("FieldX", &required("FieldX")?)?,
            field_y: number("FieldY", &required("FieldY")?)?,
            pos_x: number("PosX", &required("PosX")?)?,
            pos_y: number("PosY", &required("PosY")?)?,
        };
        self.tiles.push(record);
        Ok(())
    }

    fn dimension<B>(&mut self, e: &BytesStart, reader: &Reader<B>) -> Result<(), MetadataError> {
        let axis = match attribute(e, "DimID", reader)?.as_deref() {
            Some("1") => Axis::X,
            Some("2") => Axis::Y,
            _ => return Ok(()),
        };
        let required = |name: &'static str| -> Result<String, MetadataError> {
            attribute(e, name, reader)?.ok_or(MetadataError::MissingAxisAttribute {
                axis,
                attribute: name,
            })
        };

        let descriptor = AxisDescriptor {
            pixel_count: number("NumberOfElements", &required("NumberOfElements")?)?,
            length: number("Length", &required("Length")?)?,
            unit: required("Unit")?,
        };
        match axis {
            Axis::X => self.axis_x = Some(descriptor),
            Axis::Y => self.axis_y = Some(descriptor),
        }
        Ok(())
    }
}

fn attribute<B>(
    e: &BytesStart,
    name: &'static str,
    reader: &Reader<B>,
) -> Result<Option<String>, MetadataError> {
    let invalid = |detail: String| MetadataError::InvalidValue {
        attribute: name,
        value: detail,
    };

    match e.try_get_attribute(name).map_err(|err| invalid(err.to_string()))? {
        Some(attr) => {
            let value = attr
                .decode_and_unescape_value(reader)
                .map_err(|err| invalid(err.to_string()))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn number<T: FromStr>(attribute: &'static str, value: &str) -> Result<T, MetadataError> {
    value.trim().parse().map_err(|_| MetadataError::InvalidValue {
        attribute,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::xlif;

    fn source() -> &'static Path {
        Path::new("scan.xlif")
    }

    /// Two `Element`s, each with its own image, axes and tiles
    fn two_element_document() -> String {
        let first = xlif(&[(0, 0, 0.0, 0.0), (1, 0, 1.0, 0.0)], 1.0, "m");
        let second = xlif(&[(5, 5, 9.0, 9.0)], 2.0, "um");
        let body = |doc: &str| {
            let start = doc.find("<Element").unwrap();
            let end = doc.rfind("</Element>").unwrap() + "</Element>".len();
            doc[start..end].to_string()
        };
        format!(
            "<LMSDataContainerHeader Version=\"2\">{}{}</LMSDataContainerHeader>",
            body(&first),
            body(&second)
        )
    }

    #[test]
    fn test_parse_tiles_in_document_order() {
        let doc = xlif(&[(0, 0, 0.01, 0.02), (1, 0, 0.011, 0.02), (1, 1, 0.011, 0.021)], 0.0012, "m");
        let scan = parse(doc.as_bytes(), source()).unwrap();

        assert_eq!(scan.tiles.len(), 3);
        assert_eq!(
            scan.tiles[2],
            TileRecord { field_x: 1, field_y: 1, pos_x: 0.011, pos_y: 0.021 }
        );
        assert_eq!(scan.axis_x.pixel_count, 2048);
        assert_eq!(scan.axis_y.pixel_count, 1536);
        assert_eq!(scan.axis_x.length, 0.0012);
        assert!(scan.axis_x.is_meters());
    }

    #[test]
    fn test_ignores_other_dimensions() {
        // The DimID 10 entry has no usable Unit and must not be read
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m");
        assert!(parse(doc.as_bytes(), source()).is_ok());
    }

    #[test]
    fn test_tile_outside_scan_info_is_ignored() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m").replace(
            "<ImageDescription>",
            "<Tile FieldX=\"9\" FieldY=\"9\" PosX=\"0\" PosY=\"0\"/><ImageDescription>",
        );
        let scan = parse(doc.as_bytes(), source()).unwrap();
        assert_eq!(scan.tiles.len(), 1);
        assert_eq!(scan.tiles[0].field_x, 0);
    }

    #[test]
    fn test_only_first_element_is_read() {
        let scan = parse(two_element_document().as_bytes(), source()).unwrap();

        assert_eq!(scan.tiles.len(), 2);
        assert_eq!(scan.axis_x.length, 1.0);
        assert_eq!(scan.axis_y.unit, "m");
    }

    #[test]
    fn test_dimensions_outside_image_description_are_ignored() {
        let doc = r#"<Root><Element><Data><Image>
              <Dimensions>
                <DimensionDescription DimID="1" NumberOfElements="10" Length="1" Unit="m"/>
                <DimensionDescription DimID="2" NumberOfElements="10" Length="1" Unit="m"/>
              </Dimensions>
            </Image></Data></Element></Root>"#;
        let err = parse(doc.as_bytes(), source()).unwrap_err();
        assert!(matches!(err, MetadataError::MissingAxis(Axis::X)));
    }

    #[test]
    fn test_utf16_with_bom() {
        let doc = xlif(&[(0, 0, 0.0, 0.0), (1, 0, 0.5, 0.0)], 1.0, "m")
            .replace("encoding=\"utf-8\"", "encoding=\"UTF-16\"");
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(doc.encode_utf16().flat_map(|unit| unit.to_le_bytes()));

        let scan = parse(&bytes, source()).unwrap();
        assert_eq!(scan.tiles.len(), 2);
        assert_eq!(scan.tiles[1].pos_x, 0.5);
    }

    #[test]
    fn test_utf8_with_bom() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(doc.as_bytes());

        assert_eq!(parse(&bytes, source()).unwrap().tiles.len(), 1);
    }

    #[test]
    fn test_declared_latin1() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "\u{b5}m")
            .replace("encoding=\"utf-8\"", "encoding=\"ISO-8859-1\"");
        // Every character fits in one Latin-1 byte
        let bytes: Vec<u8> = doc.chars().map(|c| c as u8).collect();

        let scan = parse(&bytes, source()).unwrap();
        assert_eq!(scan.axis_x.unit, "\u{b5}m");
    }

    #[test]
    fn test_missing_tile_attribute() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m").replace("PosY=\"0\"", "");
        let err = parse(doc.as_bytes(), source()).unwrap_err();
        assert!(matches!(
            err,
            MetadataError::MissingTileAttribute { index: 0, attribute: "PosY" }
        ));
    }

    #[test]
    fn test_invalid_number() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m").replace("FieldX=\"0\"", "FieldX=\"zero\"");
        let err = parse(doc.as_bytes(), source()).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidValue { attribute: "FieldX", .. }));
    }

    #[test]
    fn test_missing_axis() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m").replace("DimID=\"2\"", "DimID=\"3\"");
        let err = parse(doc.as_bytes(), source()).unwrap_err();
        assert!(matches!(err, MetadataError::MissingAxis(Axis::Y)));
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        let doc = xlif(&[(0, 0, 0.0, 0.0)], 1.0, "m");
        let truncated = &doc.as_bytes()[..doc.len() / 2];
        let err = parse(truncated, source()).unwrap_err();
        assert!(matches!(err, MetadataError::Malformed { .. }));
    }
}
