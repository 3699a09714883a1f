use std::error;
use std::fmt;
use std::fs::File;
use std::path::Path;

#[derive(Debug)]
/**
 * Error raised while loading an input image.
 */
pub enum Error {
    Io(std::io::Error),
    Decode(png::DecodingError),
    Unsupported(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            Io(e) => write!(fmt, "{}", e),
            Decode(e) => write!(fmt, "{}", e),
            Unsupported(what) => write!(fmt, "unsupported image format: {}", what),
        }
    }
}

impl error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<png::DecodingError> for Error {
    fn from(e: png::DecodingError) -> Self {
        Error::Decode(e)
    }
}

/**
 * Load a PNG image as grayscale `f32` samples, returning `(samples, w, h)`
 * with the samples in row-major order. 8- and 16-bit grayscale images are
 * read natively; 8-bit RGB(A) is reduced to gray by averaging the three
 * color channels.
 */
pub fn load_gray_png<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, usize, usize), Error> {
    let decoder = png::Decoder::new(File::open(path)?);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    use png::{BitDepth, ColorType};
    let im: Vec<f32> = match (info.color_type, info.bit_depth) {
        (ColorType::Grayscale, BitDepth::Eight) => data.iter().map(|&v| f32::from(v)).collect(),
        (ColorType::Grayscale, BitDepth::Sixteen) => data
            .chunks_exact(2)
            .map(|c| f32::from(u16::from_be_bytes([c[0], c[1]])))
            .collect(),
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => {
            data.chunks_exact(2).map(|c| f32::from(c[0])).collect()
        }
        (ColorType::Rgb, BitDepth::Eight) => data
            .chunks_exact(3)
            .map(|c| (f32::from(c[0]) + f32::from(c[1]) + f32::from(c[2])) / 3.0)
            .collect(),
        (ColorType::Rgba, BitDepth::Eight) => data
            .chunks_exact(4)
            .map(|c| (f32::from(c[0]) + f32::from(c[1]) + f32::from(c[2])) / 3.0)
            .collect(),
        (color, depth) => {
            return Err(Error::Unsupported(format!(
                "{:?} at {:?} bits",
                color, depth
            )))
        }
    };
    Ok((im, info.width as usize, info.height as usize))
}
