use clap::{App, Arg};
use docfile_tool_lib::{open_docfile, parent_and_name, read_write_modes};
use std::process::exit;

fn main() {
    env_logger::init();

    let arguments = App::new("mv-docfile")
        .version("0.1.0")
        .about("This program renames an element inside its storage.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile"),
        )
        .arg(
            Arg::with_name("element")
                .required(true)
                .takes_value(true)
                .help("The path of the element to rename"),
        )
        .arg(
            Arg::with_name("new_name")
                .required(true)
                .takes_value(true)
                .help("The new name, without a path"),
        )
        .get_matches();

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image is required.");
            exit(1);
        }
    };

    let (element, new_name) = match (
        arguments.value_of("element"),
        arguments.value_of("new_name"),
    ) {
        (Some(e), Some(n)) => (e, n),
        _ => {
            eprintln!("An element and a new name are required.");
            exit(1);
        }
    };

    let root = match open_docfile(path, read_write_modes()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Docfile opening error: {}", e);
            exit(1);
        }
    };

    let (storage, name) = match parent_and_name(&root, element, false) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Could not open the parent storage: {}", e);
            exit(1);
        }
    };

    if let Err(e) = storage.rename_element(name, new_name) {
        eprintln!("Could not rename \"{}\": {}", element, e);
        exit(1);
    }

    if let Err(e) = root.commit() {
        eprintln!("Could not flush the docfile: {}", e);
        exit(1);
    }

    println!("Renamed \"{}\" to \"{}\".", element, new_name);
}
