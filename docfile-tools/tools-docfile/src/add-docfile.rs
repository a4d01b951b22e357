use clap::{App, Arg};
use docfile_tool_lib::{create_modes, open_docfile, parent_and_name, read_write_modes};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::process::exit;

const BUFFER_SIZE: usize = 4096;

fn main() {
    env_logger::init();

    let arguments = App::new("add-docfile")
        .version("0.1.0")
        .about("This program copies a file into a stream of a docfile.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile"),
        )
        .arg(
            Arg::with_name("file")
                .required(true)
                .takes_value(true)
                .help("The path of the file to add"),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .takes_value(true)
                .help("The path of the stream inside the docfile, for example /a/b/data."),
        )
        .arg(
            Arg::with_name("parents")
                .short("p")
                .long("parents")
                .takes_value(false)
                .help("Create missing storages along the stream's path."),
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

    let file_path = match arguments.value_of("file") {
        Some(f) => f.to_string(),
        None => {
            eprintln!("A file to add is required.");
            exit(1);
        }
    };

    let name = match arguments.value_of("name") {
        Some(n) => n.to_string(),
        None => match Path::new(&file_path).file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => {
                eprintln!("Could not determine a stream name to use for the docfile.");
                exit(1);
            }
        },
    };

    if !arguments.is_present("yes") {
        print!(
            "Are you sure you wish to copy \"{}\" into the docfile as \"{}\": (y/n) ",
            file_path, name
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
            println!("Will not add file.");
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

    let parents = arguments.is_present("parents");
    let (storage, stream_name) = match parent_and_name(&root, &name, parents) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Could not open the parent storage: {}", e);
            exit(1);
        }
    };

    let mut stream = match storage.create_stream(stream_name, create_modes()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Could not create stream: {}", e);
            exit(1);
        }
    };

    let mut file = match File::open(&file_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Could not open file due to error: {}", e);
            exit(1);
        }
    };

    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let amount_read = match file.read(&mut buffer) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error while reading: {}", e);
                exit(1);
            }
        };

        if amount_read == 0 {
            break;
        }

        match stream.write(&buffer[..amount_read]) {
            Ok(_) => (),
            Err(e) => {
                eprintln!("Error: {}", e);
                exit(1);
            }
        }
    }

    if let Err(e) = root.commit() {
        eprintln!("Could not flush the docfile: {}", e);
        exit(1);
    }

    println!("Successfully added file!");
}
