//! jpegdec CLI - decode baseline JPEG files to raw pixels or PPM.

use clap::{Parser, Subcommand, ValueEnum};
use jpegdec_rs::{DecodeOptions, Jpeg1Decoder};
use std::fs;
use std::path::PathBuf;

/// Baseline JPEG decoder
#[derive(Parser)]
#[command(name = "jpegdec")]
#[command(version)]
#[command(about = "Decode baseline (SOF0) YCbCr JPEG images", long_about = None)]
#[command(after_help = "EXAMPLES:
    jpegdec decode -i image.jpg -o image.ppm
    jpegdec decode -i image.jpg -o pixels.raw -f raw
    jpegdec info -i image.jpg")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a JPEG image to raw pixels or a Portable PixMap
    #[command(visible_alias = "d")]
    Decode {
        /// Input file path
        #[arg(short, long, help = "Path to the input JPEG file")]
        input: PathBuf,

        /// Output file path for decoded pixels
        #[arg(short, long, help = "Path for the output file")]
        output: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "ppm", value_enum)]
        format: OutputFormat,

        /// Accept files that end without an EOI marker
        #[arg(long)]
        lenient: bool,

        /// Refuse images with more pixels than this
        #[arg(long)]
        pixel_limit: Option<usize>,
    },

    /// Display frame header information
    #[command(visible_alias = "i")]
    Info {
        /// Input file path
        #[arg(short, long, help = "Path to the JPEG file to inspect")]
        input: PathBuf,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Portable PixMap (P6)
    Ppm,
    /// Raw interleaved RGB bytes
    Raw,
    /// Raw interleaved RGBA bytes, alpha opaque
    Rgba,
}

fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            format,
            lenient,
            pixel_limit,
        } => {
            let mut options = DecodeOptions {
                require_end_of_image: !lenient,
                ..DecodeOptions::default()
            };
            if pixel_limit.is_some() {
                options.pixel_limit = pixel_limit;
            }
            decode_image(&input, &output, &format, options)
        }
        Commands::Info { input } => show_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn decode_image(
    input: &PathBuf,
    output: &PathBuf,
    format: &OutputFormat,
    options: DecodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let raster = Jpeg1Decoder::with_options(&data, options).decode()?;

    match format {
        OutputFormat::Ppm => write_ppm(output, raster.as_rgb8(), raster.width, raster.height)?,
        OutputFormat::Raw => fs::write(output, raster.as_rgb8())?,
        OutputFormat::Rgba => fs::write(output, raster.to_rgba8())?,
    }

    tracing::info!(
        width = raster.width,
        height = raster.height,
        output = %output.display(),
        "decoded"
    );
    Ok(())
}

fn show_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());

    let mut decoder = Jpeg1Decoder::new(&data);
    let frame = decoder.read_header()?;
    println!("  Dimensions: {}x{}", frame.width, frame.height);
    println!("  Bit depth:  {} bits", frame.precision);
    for (name, component) in ["Y ", "Cb", "Cr"].iter().zip(frame.components.iter()) {
        println!(
            "  {} (id {}): sampling {}x{}, quantization table {}",
            name,
            component.id,
            component.horizontal_sampling,
            component.vertical_sampling,
            component.quant_table_id
        );
    }
    let tables = decoder.tables();
    println!(
        "  Tables before frame: {} quantization, {} DC, {} AC",
        defined(&tables.quantization),
        defined(&tables.huffman_dc),
        defined(&tables.huffman_ac)
    );

    Ok(())
}

fn defined<T>(slots: &[Option<T>]) -> usize {
    slots.iter().filter(|slot| slot.is_some()).count()
}

fn write_ppm(
    path: &PathBuf,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;
    let mut file = fs::File::create(path)?;

    writeln!(file, "P6")?;
    writeln!(file, "{} {}", width, height)?;
    writeln!(file, "255")?;
    file.write_all(pixels)?;

    Ok(())
}
