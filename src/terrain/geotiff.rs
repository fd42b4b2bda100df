use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType;

use crate::error::{RasterError, Result};
use crate::field::Grid;

use super::{Terrain, DEGREES_TO_METERS};

/// Loads a single-band elevation GeoTIFF.
///
/// Integer and floating-point samples are converted to `f32`. The sample
/// spacing comes from the first component of the `ModelPixelScale` tag,
/// converted from degrees with a fixed metres-per-degree factor.
#[derive(Debug)]
pub struct LoadGeoTiff {
    path: PathBuf,
    degrees_to_meters: f64,
}

impl LoadGeoTiff {
    /// Creates a new loader for `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            degrees_to_meters: DEGREES_TO_METERS,
        }
    }

    /// Overrides the metres-per-degree factor applied to the pixel scale.
    #[must_use]
    pub fn with_degrees_to_meters(mut self, factor: f64) -> Self {
        self.degrees_to_meters = factor;
        self
    }

    /// Executes the load.
    ///
    /// # Errors
    ///
    /// Returns `RasterError::NotFound` if the file does not exist,
    /// `RasterError::UnsupportedFormat` for multi-band or 64-bit integer
    /// samples, `RasterError::MissingTag` without a pixel scale, and
    /// `RasterError::Decode` for malformed files.
    pub fn execute(&self) -> Result<Terrain> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RasterError::NotFound(self.path.clone()),
            _ => RasterError::Io(e),
        })?;
        let terrain = self.decode(BufReader::new(file))?;
        tracing::debug!(
            path = %self.path.display(),
            width = terrain.heightmap.width(),
            height = terrain.heightmap.height(),
            spacing = terrain.spacing,
            "loaded elevation raster"
        );
        Ok(terrain)
    }

    fn decode<R: Read + Seek>(&self, reader: R) -> Result<Terrain> {
        let mut decoder = Decoder::new(reader).map_err(RasterError::from)?;

        let color = decoder.colortype().map_err(RasterError::from)?;
        if !matches!(color, ColorType::Gray(_)) {
            return Err(RasterError::UnsupportedFormat(format!("{color:?}")).into());
        }
        let (width, height) = decoder.dimensions().map_err(RasterError::from)?;

        let scale = decoder
            .find_tag(Tag::ModelPixelScaleTag)
            .map_err(RasterError::from)?
            .ok_or(RasterError::MissingTag("ModelPixelScale"))?
            .into_f64_vec()
            .map_err(RasterError::from)?;
        let pixel_scale = scale
            .first()
            .copied()
            .ok_or(RasterError::MissingTag("ModelPixelScale"))?;

        let samples = to_f32(decoder.read_image().map_err(RasterError::from)?)?;

        let heightmap = Grid::from_vec(width as usize, height as usize, samples)?;
        Ok(Terrain::new(heightmap, pixel_scale * self.degrees_to_meters))
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn to_f32(result: DecodingResult) -> std::result::Result<Vec<f32>, RasterError> {
    let samples = match result {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|s| s as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(RasterError::UnsupportedFormat(
                "64-bit integer samples".to_owned(),
            ))
        }
    };
    Ok(samples)
}
