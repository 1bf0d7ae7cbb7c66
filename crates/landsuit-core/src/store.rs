//! Raster source/sink boundary and a directory-backed implementation.
//!
//! [`Workspace`] resolves identifiers against a root directory and picks the
//! format from the extension: `.json` (serde) or `.tif`/`.tiff` (single-band
//! GeoTIFF). An identifier without an extension is saved and loaded as `.tif`.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use crate::error::{Result, SuitabilityError};
use crate::raster::{Raster, DEFAULT_NODATA};

/// GeoTIFF ModelPixelScaleTag: `[scale_x, scale_y, scale_z]`.
const MODEL_PIXEL_SCALE: u16 = 33550;
/// GeoTIFF ModelTiepointTag: `[i, j, k, x, y, z]`.
const MODEL_TIEPOINT: u16 = 33922;
/// GDAL_NODATA, stored as an ASCII string.
const GDAL_NODATA: u16 = 42113;

/// Loads a raster by identifier.
pub trait RasterSource {
    /// Fails with `RasterNotFound` when nothing exists under `id`, or
    /// `RasterIo` when it exists but cannot be read as a raster.
    fn load(&self, id: &str) -> Result<Raster>;
}

/// Persists a raster under an identifier, replacing any existing one.
pub trait RasterSink {
    fn save(&self, raster: &Raster, id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RasterFormat {
    Json,
    GeoTiff,
}

impl RasterFormat {
    fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(RasterFormat::Json),
            Some("tif") | Some("tiff") => Ok(RasterFormat::GeoTiff),
            other => Err(io_error(
                path,
                format!("unsupported raster extension {:?}", other.unwrap_or("")),
            )),
        }
    }
}

/// A directory holding input and output rasters.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute identifiers are used as-is; relative ones are joined to the
    /// workspace root. A missing extension defaults to `.tif`.
    pub fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        let mut resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        if resolved.extension().is_none() {
            resolved.set_extension("tif");
        }
        resolved
    }
}

impl RasterSource for Workspace {
    fn load(&self, id: &str) -> Result<Raster> {
        let path = self.resolve(id);
        if !path.is_file() {
            return Err(SuitabilityError::RasterNotFound { path });
        }
        let raster = match RasterFormat::for_path(&path)? {
            RasterFormat::Json => read_json(&path)?,
            RasterFormat::GeoTiff => read_geotiff(&path)?,
        };
        tracing::debug!(
            path = %path.display(),
            rows = raster.height(),
            cols = raster.width(),
            cell_size = raster.cell_size(),
            "raster loaded"
        );
        Ok(raster)
    }
}

impl RasterSink for Workspace {
    fn save(&self, raster: &Raster, id: &str) -> Result<()> {
        let path = self.resolve(id);
        let format = RasterFormat::for_path(&path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        match format {
            RasterFormat::Json => write_json(raster, &path)?,
            RasterFormat::GeoTiff => write_geotiff(raster, &path)?,
        }
        tracing::debug!(path = %path.display(), "raster saved");
        Ok(())
    }
}

fn io_error(path: &Path, err: impl Display) -> SuitabilityError {
    SuitabilityError::RasterIo {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

// ── JSON ─────────────────────────────────────────────────────────────────────

fn read_json(path: &Path) -> Result<Raster> {
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&text).map_err(|e| io_error(path, e))
}

fn write_json(raster: &Raster, path: &Path) -> Result<()> {
    let json = serde_json::to_string(raster).map_err(|e| io_error(path, e))?;
    fs::write(path, json).map_err(|e| io_error(path, e))
}

// ── GeoTIFF ──────────────────────────────────────────────────────────────────

fn read_geotiff(path: &Path) -> Result<Raster> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(|e| io_error(path, e))?;

    let mut limits = Limits::default();
    limits.decoding_buffer_size = 1024 * 1024 * 1024;
    limits.intermediate_buffer_size = 1024 * 1024 * 1024;
    limits.ifd_value_size = 1024 * 1024 * 1024;
    decoder = decoder.with_limits(limits);

    let (width, height) = decoder.dimensions().map_err(|e| io_error(path, e))?;
    let (width, height) = (width as usize, height as usize);

    let data = decode_cells(&mut decoder).map_err(|e| io_error(path, e))?;
    if width.checked_mul(height) != Some(data.len()) {
        return Err(io_error(
            path,
            format!(
                "expected one band of {}x{} cells, decoded {} samples",
                width,
                height,
                data.len()
            ),
        ));
    }

    let (cell_size, origin_x, origin_y) = read_georeference(&mut decoder);
    let nodata = read_nodata(&mut decoder);

    Ok(Raster::new(width, height, cell_size, data)
        .map_err(|e| io_error(path, e))?
        .with_origin(origin_x, origin_y)
        .with_nodata(nodata))
}

fn decode_cells<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> tiff::TiffResult<Vec<f32>> {
    Ok(match decoder.read_image()? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    })
}

/// `(cell_size, origin_x, origin_y)` from the pixel-scale and tiepoint tags.
/// Untagged images get unit cells with the origin at (0, 0).
fn read_georeference<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> (f64, f64, f64) {
    let scale = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE)).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT)).ok();

    let cell_size = match scale.as_deref() {
        Some([sx, sy, ..]) if *sx > 0.0 => {
            if (sx - sy).abs() > f64::EPSILON * sx.abs() {
                tracing::warn!(scale_x = sx, scale_y = sy, "non-square cells, using x scale");
            }
            *sx
        }
        _ => 1.0,
    };

    let (origin_x, origin_y) = match tiepoint.as_deref() {
        // Tiepoint (i, j) in pixel space maps to (x, y); shift back to pixel (0, 0).
        Some([i, j, _, x, y, ..]) => (x - i * cell_size, y + j * cell_size),
        _ => (0.0, 0.0),
    };

    (cell_size, origin_x, origin_y)
}

fn read_nodata<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> f32 {
    decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA))
        .ok()
        .and_then(|s| s.trim_end_matches('\0').trim().parse().ok())
        .unwrap_or(DEFAULT_NODATA)
}

fn write_geotiff(raster: &Raster, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(|e| io_error(path, e))?;

    let width = u32::try_from(raster.width()).map_err(|e| io_error(path, e))?;
    let height = u32::try_from(raster.height()).map_err(|e| io_error(path, e))?;
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(width, height)
        .map_err(|e| io_error(path, e))?;

    let cell_size = raster.cell_size();
    let (origin_x, origin_y) = raster.origin();
    let nodata = raster.nodata().to_string();

    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &[cell_size, cell_size, 0.0][..])
        .map_err(|e| io_error(path, e))?;
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), &[0.0, 0.0, 0.0, origin_x, origin_y, 0.0][..])
        .map_err(|e| io_error(path, e))?;
    image
        .encoder()
        .write_tag(Tag::Unknown(GDAL_NODATA), nodata.as_str())
        .map_err(|e| io_error(path, e))?;

    image.write_data(raster.data()).map_err(|e| io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reclass::reclassify_by_value;
    use crate::tables::land_use_table;

    fn sample() -> Raster {
        Raster::new(3, 2, 30.0, vec![1.0, 2.5, -9999.0, 4.0, 5.0, 6.0])
            .unwrap()
            .with_origin(440_720.0, 3_751_320.0)
            .with_nodata(-9999.0)
    }

    #[test]
    fn resolve_relative_absolute_and_bare_names() {
        let ws = Workspace::new("/data/ws");
        assert_eq!(ws.resolve("dem.json"), PathBuf::from("/data/ws/dem.json"));
        assert_eq!(ws.resolve("suitability"), PathBuf::from("/data/ws/suitability.tif"));
        assert_eq!(ws.resolve("/elsewhere/lu.tif"), PathBuf::from("/elsewhere/lu.tif"));
    }

    #[test]
    fn json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.save(&sample(), "out/sample.json").unwrap();
        assert_eq!(ws.load("out/sample.json").unwrap(), sample());
    }

    #[test]
    fn geotiff_store_keeps_georeference_and_nodata() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.save(&sample(), "sample").unwrap();
        assert!(dir.path().join("sample.tif").is_file());

        let back = ws.load("sample.tif").unwrap();
        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.cell_size(), 30.0);
        assert_eq!(back.origin(), (440_720.0, 3_751_320.0));
        assert_eq!(back.nodata(), -9999.0);
        assert_eq!(back.value(0, 2), None);
        assert_eq!(back.data(), sample().data());
    }

    #[test]
    fn integer_land_use_tiffs_load_as_codes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let file = File::create(dir.path().join("lu8.tif")).unwrap();
            let mut enc = TiffEncoder::new(BufWriter::new(file)).unwrap();
            enc.write_image::<colortype::Gray8>(3, 2, &[18u8, 73, 11, 42, 242, 171])
                .unwrap();
        }
        {
            let file = File::create(dir.path().join("lu16.tif")).unwrap();
            let mut enc = TiffEncoder::new(BufWriter::new(file)).unwrap();
            enc.write_image::<colortype::Gray16>(3, 2, &[18u16, 73, 999, 60, 172, 12])
                .unwrap();
        }
        let ws = Workspace::new(dir.path());
        let table = land_use_table().unwrap();

        let lu8 = ws.load("lu8.tif").unwrap();
        assert_eq!(lu8.shape(), (2, 3));
        assert_eq!(lu8.cell_size(), 1.0);
        assert_eq!(lu8.origin(), (0.0, 0.0));
        assert_eq!(lu8.nodata(), DEFAULT_NODATA);
        assert_eq!(lu8.data(), &[18.0, 73.0, 11.0, 42.0, 242.0, 171.0]);
        let mask = reclassify_by_value(&lu8, &table);
        assert_eq!(mask.data(), &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);

        let lu16 = ws.load("lu16").unwrap();
        let mask = reclassify_by_value(&lu16, &table);
        assert_eq!(mask.value(0, 0), Some(1.0));
        assert_eq!(mask.value(0, 1), Some(1.0));
        assert_eq!(mask.value(0, 2), None);
        assert_eq!(mask.value(1, 0), Some(0.0));
    }

    #[test]
    fn save_overwrites_existing_raster() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.save(&sample(), "r.json").unwrap();
        let replacement = Raster::filled(1, 1, 1.0, 42.0).unwrap();
        ws.save(&replacement, "r.json").unwrap();
        assert_eq!(ws.load("r.json").unwrap(), replacement);
    }

    #[test]
    fn missing_raster_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        assert!(matches!(
            ws.load("nope.tif"),
            Err(SuitabilityError::RasterNotFound { .. })
        ));
    }

    #[test]
    fn oversized_json_header_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let json = format!(
            r#"{{"width":{},"height":3,"cell_size":1.0,"origin_x":0.0,"origin_y":0.0,"nodata":-1.0,"data":[1.0]}}"#,
            usize::MAX / 2
        );
        fs::write(dir.path().join("dem.json"), json).unwrap();
        let ws = Workspace::new(dir.path());
        assert!(matches!(ws.load("dem.json"), Err(SuitabilityError::RasterIo { .. })));
    }

    #[test]
    fn unreadable_content_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.tif"), b"not a tiff").unwrap();
        fs::write(dir.path().join("bad.json"), b"{\"width\": 1}").unwrap();
        fs::write(dir.path().join("dem.asc"), b"ncols 1").unwrap();
        let ws = Workspace::new(dir.path());
        for id in ["bad.tif", "bad.json", "dem.asc"] {
            assert!(
                matches!(ws.load(id), Err(SuitabilityError::RasterIo { .. })),
                "{id} should fail with RasterIo"
            );
        }
    }
}
