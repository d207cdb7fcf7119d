//! Shared test fixtures: synthetic grids and on-disk scan directories.

use image::{Rgb, RgbImage, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::grid::{AxisDescriptor, ThumbnailSlot, Tile, TileGrid};
use crate::scan;

pub(crate) fn meters(length: f64, pixel_count: u32) -> AxisDescriptor {
    AxisDescriptor {
        pixel_count,
        length,
        unit: "m".to_string(),
    }
}

/// Grid from (field_x, field_y, pos_x, pos_y) tuples with square tiles
pub(crate) fn grid_of(tiles: &[(i32, i32, f64, f64)], length: f64) -> TileGrid {
    let tiles = tiles
        .iter()
        .enumerate()
        .map(|(i, &(fx, fy, px, py))| Tile::new(fx, fy, px, py, PathBuf::from(format!("tile{i:03}.jpg"))))
        .collect();
    TileGrid::new(tiles, meters(length, 100), meters(length, 100))
}

/// Mark every tile as having a 10x10 thumbnail
pub(crate) fn with_thumbnails(mut grid: TileGrid) -> TileGrid {
    for i in 0..grid.len() {
        grid.settle_thumbnail(i, ThumbnailSlot::Ready(RgbaImage::new(10, 10)));
    }
    grid
}

pub(crate) fn xlif(tiles: &[(i32, i32, f64, f64)], length: f64, unit: &str) -> String {
    let tile_lines: String = tiles
        .iter()
        .map(|(fx, fy, px, py)| {
            format!("          <Tile FieldX=\"{fx}\" FieldY=\"{fy}\" PosX=\"{px}\" PosY=\"{py}\"/>\n")
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<LMSDataContainerHeader Version="2">
  <Element Name="scan" Visibility="1">
    <Data>
      <Image TextDescription="">
        <ImageDescription>
          <Channels>
            <ChannelDescription DataType="0" ChannelTag="1" Resolution="8"/>
          </Channels>
          <Dimensions>
            <DimensionDescription DimID="1" NumberOfElements="2048" Origin="0" Length="{length}" Unit="{unit}" BitInc="0" BytesInc="3"/>
            <DimensionDescription DimID="2" NumberOfElements="1536" Origin="0" Length="{length}" Unit="{unit}" BitInc="0" BytesInc="6144"/>
            <DimensionDescription DimID="10" NumberOfElements="{count}" Origin="0" Length="0" Unit="" BitInc="0" BytesInc="0"/>
          </Dimensions>
        </ImageDescription>
        <Attachment Name="TileScanInfo" Application="LAS AF" FlipX="0" FlipY="0" SwapXY="0">
{tile_lines}        </Attachment>
      </Image>
    </Data>
  </Element>
</LMSDataContainerHeader>
"#,
        count = tiles.len(),
    )
}

/// Temp directory holding a scan folder named `scan`
pub(crate) struct ScanFixture {
    _root: TempDir,
    pub scan: PathBuf,
}

pub(crate) fn write_document(document: impl AsRef<[u8]>) -> ScanFixture {
    let root = TempDir::new().unwrap();
    let scan = root.path().join("scan");
    let path = scan::description_path(&scan).unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, document).unwrap();
    ScanFixture { _root: root, scan }
}

pub(crate) fn write_scan(tiles: &[(i32, i32, f64, f64)], length: f64, unit: &str) -> ScanFixture {
    write_document(&xlif(tiles, length, unit))
}

/// Write a solid-color JPEG for each of the first `count` tiles
pub(crate) fn write_tile_images(scan_dir: &Path, count: usize, width: u32, height: u32) {
    for i in 0..count {
        let shade = (40 * i % 256) as u8;
        let image = RgbImage::from_pixel(width, height, Rgb([shade, 128, 255 - shade]));
        image.save(scan::tile_image_path(scan_dir, i).unwrap()).unwrap();
    }
}
