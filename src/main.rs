use fli_reader::FliFile;
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-fli-file> [--no-subtract] [--no-squeeze]", args[0]);
        std::process::exit(1);
    }

    let fli_path = &args[1];
    let subtract_background = !args.iter().any(|arg| arg == "--no-subtract");
    let squeeze = !args.iter().any(|arg| arg == "--no-squeeze");

    println!("Reading FLI file: {}", fli_path);
    println!("{}", "=".repeat(60));

    let mut file = match FliFile::open(fli_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("\nERROR: Failed to open FLI file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let layout = file.describe().clone();
    println!("\nFile Information:");
    println!("  Version: {}", layout.version);
    println!("  Data start: byte {}", file.data_start());
    println!("  Image shape: {}", layout.image_shape);
    println!("  Pixel type: {}", layout.pixel_type);
    println!("  Compressed: {}", layout.compressed);
    match &layout.background {
        Some(bg) => println!("  Background: {} ({})", bg.shape, bg.pixel_type),
        None => println!("  Background: none"),
    }

    println!("\nHeader Chapters:");
    for chapter in file.header().chapters() {
        let sections: Vec<&str> = file.header().sections(chapter).collect();
        println!("  {{{}}} [{}]", chapter, sections.join("] ["));
    }

    match file.get_image_data(subtract_background, squeeze) {
        Ok(image) => {
            println!("\n{}", "=".repeat(60));
            println!("SUCCESS! Decoding completed.");
            println!("{}", "=".repeat(60));
            println!("  Array shape: {:?}", image.shape());
            println!("  Element type: {:?}", image.sample_format());
            println!("  Elements: {}", image.len());
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to decode pixel data");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    for diagnostic in file.diagnostics() {
        println!("  Warning: {}", diagnostic);
    }
}
