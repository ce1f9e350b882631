//! Render a string into a luminance texture and write it out as a PGM file.
//!
//! Usage: `lumo <font-file> <text> [size-px]`
//!
//! Set `RUST_LOG=debug` to watch the session and compositor at work.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lumo_text::{DirectoryStore, EngineContext, FontSession, PixelFormat, TextureSink};

/// Writes luminance buffers as binary PGM files.
struct PgmSink {
    path: PathBuf,
}

impl TextureSink for PgmSink {
    type Handle = std::io::Result<PathBuf>;

    fn upload(&mut self, pixels: &[u8], size_px: [u32; 2], format: PixelFormat) -> Self::Handle {
        debug_assert_eq!(format, PixelFormat::Luminance8);
        let mut file = std::fs::File::create(&self.path)?;
        write!(file, "P5\n{} {}\n255\n", size_px[0], size_px[1])?;
        file.write_all(pixels)?;
        Ok(self.path.clone())
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(font_arg), Some(text)) = (args.next(), args.next()) else {
        eprintln!("usage: lumo <font-file> <text> [size-px]");
        return ExitCode::FAILURE;
    };
    let size: f32 = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(32.0);

    let font_path = PathBuf::from(&font_arg);
    let store = DirectoryStore::new(
        font_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf(),
    );
    let Some(font_name) = font_path.file_name().and_then(|name| name.to_str()) else {
        eprintln!("not a font file path: {font_arg}");
        return ExitCode::FAILURE;
    };

    let mut ctx = EngineContext::new();
    let mut session = FontSession::new();
    if let Err(err) = session.open(&store, font_name) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    let mut sink = PgmSink {
        path: PathBuf::from("lumo-text.pgm"),
    };

    let code = match session.get_or_create(&mut ctx, &text, size) {
        Ok(texture) => {
            let metrics = texture.metrics();
            let uv = texture.uv();
            log::info!(
                "composited {:?}: {}x{} texture, baseline {}, total {}, uv ({:.3}, {:.3})",
                text,
                texture.width(),
                texture.height(),
                metrics.base_line(),
                metrics.total(),
                uv.max[0],
                uv.max[1],
            );
            match texture.upload_to(&mut sink) {
                Ok(path) => {
                    println!("wrote {}", path.display());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("failed to write image: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    };

    session.close();
    code
}
