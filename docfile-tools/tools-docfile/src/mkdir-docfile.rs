use clap::{App, Arg};
use docfile_tool_lib::{open_docfile, parent_and_name, read_write_modes};
use std::process::exit;

fn main() {
    env_logger::init();

    let arguments = App::new("mkdir-docfile")
        .version("0.1.0")
        .about("This program creates a storage in a docfile.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile"),
        )
        .arg(
            Arg::with_name("storage")
                .required(true)
                .takes_value(true)
                .help("The path of the storage to create, for example /a/b"),
        )
        .arg(
            Arg::with_name("parents")
                .short("p")
                .long("parents")
                .takes_value(false)
                .help("Create missing storages along the path."),
        )
        .get_matches();

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image is required.");
            exit(1);
        }
    };

    let storage_path = match arguments.value_of("storage") {
        Some(s) => s,
        None => {
            eprintln!("A storage path is required.");
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

    let parents = arguments.is_present("parents");
    let (parent, name) = match parent_and_name(&root, storage_path, parents) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Could not open the parent storage: {}", e);
            exit(1);
        }
    };

    if let Err(e) = parent.create_storage(name, read_write_modes()) {
        eprintln!("Could not create \"{}\": {}", storage_path, e);
        exit(1);
    }

    if let Err(e) = root.commit() {
        eprintln!("Could not flush the docfile: {}", e);
        exit(1);
    }
}
