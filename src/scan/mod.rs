/// Scan directory loading
///
/// A scan directory `<dir>` holds:
/// - `<dir>/leicametadata/<name>.xlif` - the scan description
/// - `<dir>/<name>--StageNNN.jpg` - one image per tile, NNN = parse order
///
/// where `<name>` is the directory's base name.

pub mod xlif;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MetadataError, UnitMismatch};
use crate::grid::{Axis, Tile, TileGrid};

/// Subdirectory holding the scan description
pub const METADATA_DIR: &str = "leicametadata";

/// A freshly parsed grid plus the non-fatal problems found on the way
#[derive(Debug)]
pub struct ParsedScan {
    pub grid: TileGrid,
    pub warnings: Vec<UnitMismatch>,
}

/// Base name of the scan directory, the prefix of every file in it
pub fn scan_name(dir: &Path) -> Result<String, MetadataError> {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| MetadataError::InvalidDirectory(dir.to_path_buf()))
}

pub fn description_path(dir: &Path) -> Result<PathBuf, MetadataError> {
    let name = scan_name(dir)?;
    Ok(dir.join(METADATA_DIR).join(format!("{name}.xlif")))
}

/// Image file of the tile at `index` in parse order
pub fn tile_image_path(dir: &Path, index: usize) -> Result<PathBuf, MetadataError> {
    let name = scan_name(dir)?;
    Ok(dir.join(format!("{name}--Stage{index:03}.jpg")))
}

/// Read a scan directory into a new tile grid.
///
/// The grid is unfitted (scale 0) and has no thumbnails.
pub fn load_scan(dir: &Path) -> Result<ParsedScan, MetadataError> {
    let path = description_path(dir)?;
    let document = fs::read(&path).map_err(|source| MetadataError::Unreadable {
        path: path.clone(),
        source,
    })?;

    let description = xlif::parse(&document, &path)?;

    let tiles = description
        .tiles
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Ok(Tile::new(
                record.field_x,
                record.field_y,
                record.pos_x,
                record.pos_y,
                tile_image_path(dir, i)?,
            ))
        })
        .collect::<Result<Vec<_>, MetadataError>>()?;

    let warnings: Vec<UnitMismatch> = [
        (Axis::X, &description.axis_x),
        (Axis::Y, &description.axis_y),
    ]
    .into_iter()
    .filter(|(_, descriptor)| !descriptor.is_meters())
    .map(|(axis, descriptor)| UnitMismatch {
        axis,
        unit: descriptor.unit.clone(),
    })
    .collect();

    tracing::info!(
        scan = %dir.display(),
        tiles = tiles.len(),
        "parsed scan description"
    );

    Ok(ParsedScan {
        grid: TileGrid::new(tiles, description.axis_x, description.axis_y),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{write_document, write_scan, xlif};

    #[test]
    fn test_paths_follow_naming_convention() {
        let dir = Path::new("/data/run7");

        assert_eq!(
            description_path(dir).unwrap(),
            PathBuf::from("/data/run7/leicametadata/run7.xlif")
        );
        assert_eq!(
            tile_image_path(dir, 4).unwrap(),
            PathBuf::from("/data/run7/run7--Stage004.jpg")
        );
        assert_eq!(
            tile_image_path(dir, 1234).unwrap(),
            PathBuf::from("/data/run7/run7--Stage1234.jpg")
        );
    }

    #[test]
    fn test_root_directory_has_no_name() {
        assert!(matches!(
            description_path(Path::new("/")),
            Err(MetadataError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn test_load_scan_builds_grid() {
        let fixture = write_scan(&[(0, 0, 0.0, 0.0), (1, 0, 1.0, 0.0), (2, 0, 2.0, 0.0)], 1.0, "m");
        let parsed = load_scan(&fixture.scan).unwrap();

        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.grid.len(), 3);
        assert_eq!(parsed.grid.total_width(), 3.0);
        assert_eq!(parsed.grid.index_of((2, 0)), Some(2));
        assert_eq!(
            parsed.grid.image_path(2),
            Some(fixture.scan.join("scan--Stage002.jpg").as_path())
        );
    }

    #[test]
    fn test_unit_mismatch_is_a_warning() {
        let fixture = write_scan(&[(0, 0, 0.0, 0.0)], 1200.0, "um");
        let parsed = load_scan(&fixture.scan).unwrap();

        assert_eq!(parsed.grid.len(), 1);
        assert_eq!(
            parsed.warnings,
            vec![
                UnitMismatch { axis: Axis::X, unit: "um".to_string() },
                UnitMismatch { axis: Axis::Y, unit: "um".to_string() },
            ]
        );
    }

    #[test]
    fn test_load_utf16_description() {
        let document = xlif(&[(0, 0, 0.0, 0.0), (1, 0, 1.0, 0.0)], 1.0, "m");
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(document.encode_utf16().flat_map(|unit| unit.to_le_bytes()));
        let fixture = write_document(&bytes);

        let parsed = load_scan(&fixture.scan).unwrap();
        assert_eq!(parsed.grid.len(), 2);
        assert_eq!(parsed.grid.total_width(), 2.0);
    }

    #[test]
    fn test_missing_description() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_scan(dir.path()).unwrap_err();
        assert!(matches!(err, MetadataError::Unreadable { .. }));
    }

    #[test]
    fn test_garbage_description() {
        let fixture = write_document("<not xml");
        assert!(load_scan(&fixture.scan).is_err());
    }
}
