use clap::{App, Arg};
use docfile_tool_lib::{open_docfile, parent_and_name, read_modes};
use std::fs::File;
use std::io::Write;
use std::process::exit;

fn main() {
    env_logger::init();

    let arguments = App::new("read-docfile")
        .version("0.1.0")
        .about("This program reads a stream from a docfile.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile"),
        )
        .arg(
            Arg::with_name("stream")
                .required(true)
                .takes_value(true)
                .help("The path of the stream to read, for example /a/b/data"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Write the contents to this file instead of stdout."),
        )
        .get_matches();

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image is required.");
            exit(1);
        }
    };

    let stream_path = match arguments.value_of("stream") {
        Some(s) => s,
        None => {
            eprintln!("A stream name is required to read.");
            exit(1);
        }
    };

    let root = match open_docfile(path, read_modes()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Docfile opening error: {}", e);
            exit(1);
        }
    };

    let (storage, name) = match parent_and_name(&root, stream_path, false) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Could not open the parent storage: {}", e);
            exit(1);
        }
    };

    let mut stream = match storage.open_stream(name, read_modes()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("No stream exists with name \"{}\": {}", stream_path, e);
            exit(1);
        }
    };

    let contents = match stream.read_to_end() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("An error occurred while reading stream contents: {}", e);
            exit(1);
        }
    };

    let result = match arguments.value_of("output") {
        Some(output) => match File::create(output) {
            Ok(mut f) => f.write_all(&contents),
            Err(e) => {
                eprintln!("Could not create {}: {}", output, e);
                exit(1);
            }
        },
        None => std::io::stdout().write_all(&contents),
    };

    if let Err(e) = result {
        eprintln!("Could not write the contents: {}", e);
        exit(1);
    }
}
