use clap::{App, Arg};
use docfile_tool_lib::{open_docfile, parent_and_name, read_write_modes};
use std::io::Write;
use std::process::exit;

fn main() {
    env_logger::init();

    let arguments = App::new("rm-docfile")
        .version("0.1.0")
        .about("This program removes a stream or a storage and everything in it from a docfile.")
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
                .help("The path of the element to remove"),
        )
        .arg(
            Arg::with_name("yes")
                .short("y")
                .takes_value(false)
                .help("Do not ask for confirmation."),
        )
        .get_matches();

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image is required.");
            exit(1);
        }
    };

    let element = match arguments.value_of("element") {
        Some(e) => e,
        None => {
            eprintln!("An element to remove is required.");
            exit(1);
        }
    };

    if !arguments.is_present("yes") {
        print!(
            "Are you sure you wish to remove \"{}\" from the docfile: (y/n) ",
            element
        );

        match std::io::stdout().flush() {
            Ok(_) => (),
            Err(_) => (),
        }

        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(_) => (),
            Err(_) => {
                eprintln!("Failed to read response.");
                exit(1);
            }
        }

        let input = input.trim_end_matches(|c| c == '\n' || c == '\r');
        if input != "y" && input != "Y" {
            println!("Will not remove element.");
            exit(0);
        }
    }

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

    match storage.destroy_element(name) {
        Ok(_) => (),
        Err(e) => {
            eprintln!("Could not remove element due to error: {}", e);
            exit(1);
        }
    }

    if let Err(e) = root.commit() {
        eprintln!("Could not flush the docfile: {}", e);
        exit(1);
    }

    println!("Successfully removed element!");
}
