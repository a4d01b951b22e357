use clap::{App, Arg};
use docfile::StorageMode;
use docfile_tool_lib::{create_docfile, read_write_modes};
use std::process::exit;

fn main() {
    env_logger::init();

    let arguments = App::new("mkimage-docfile")
        .version("0.1.0")
        .about("This program creates an empty docfile.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile to create"),
        )
        .arg(
            Arg::with_name("force")
                .short("f")
                .long("force")
                .takes_value(false)
                .help("Overwrite the file if it already exists."),
        )
        .get_matches();

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image path is required.");
            exit(1);
        }
    };

    let mut modes = read_write_modes();
    if arguments.is_present("force") {
        modes |= StorageMode::Create;
    }

    let root = match create_docfile(path, modes) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Could not create docfile: {}", e);
            exit(1);
        }
    };

    if let Err(e) = root.commit() {
        eprintln!("Could not flush the docfile: {}", e);
        exit(1);
    }

    println!("Created docfile at {}", path);
}
