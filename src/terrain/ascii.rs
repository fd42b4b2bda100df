use std::io::Write;

use crate::error::{RasterError, Result};

use super::Terrain;

/// Writes a terrain as an ESRI ASCII grid (`.asc`).
///
/// The header carries `ncols`, `nrows`, a zero lower-left corner and the
/// cell size, followed by one line of space-separated samples per row.
#[derive(Debug)]
pub struct WriteAsciiGrid<'a> {
    terrain: &'a Terrain,
}

impl<'a> WriteAsciiGrid<'a> {
    /// Creates a new writer for `terrain`.
    #[must_use]
    pub fn new(terrain: &'a Terrain) -> Self {
        Self { terrain }
    }

    /// Executes the export into `out`.
    ///
    /// # Errors
    ///
    /// Returns `RasterError::Io` if writing fails.
    pub fn execute<W: Write>(&self, out: &mut W) -> Result<()> {
        self.write(out).map_err(|e| RasterError::Io(e).into())
    }

    fn write<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let map = &self.terrain.heightmap;
        writeln!(out, "ncols        {}", map.width())?;
        writeln!(out, "nrows        {}", map.height())?;
        writeln!(out, "xllcorner    0.0")?;
        writeln!(out, "yllcorner    0.0")?;
        writeln!(out, "cellsize     {}", self.terrain.spacing)?;

        if map.width() == 0 {
            return Ok(());
        }
        for row in map.as_slice().chunks(map.width()) {
            let line: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
