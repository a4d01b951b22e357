use clap::{App, Arg};
use docfile::{ElementType, StatInfo};
use docfile_tool_lib::{
    open_docfile, read_modes, split_path, u64_to_sized_string, walk_storages, Docfile,
};
use std::process::exit;

const SPACER: &str = "    ";

fn print_long(stat: &StatInfo, name: &str) {
    let kind = match stat.element_type() {
        ElementType::Storage => "d",
        ElementType::Stream => "-",
    };

    let modified = match stat.modified() {
        Some(t) => t.format("%b %d %H:%M:%S").to_string(),
        None => String::from("-"),
    };

    println!(
        "{}{}{:<10}{}{:<16}{}{}",
        kind,
        SPACER,
        u64_to_sized_string(stat.size()),
        SPACER,
        modified,
        SPACER,
        name
    );
}

fn list(storage: &Docfile, prefix: &str, long: bool, recursive: bool) {
    let elements = match storage.enum_elements() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Could not list storage: {}", e);
            exit(1);
        }
    };

    for element in elements {
        let stat = match element {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Could not read element: {}", e);
                exit(1);
            }
        };

        let name = format!("{}{}", prefix, stat.name().unwrap_or(""));

        if long {
            print_long(&stat, &name);
        } else {
            println!("{}", name);
        }

        if recursive && stat.is_storage() {
            let child = match storage.open_storage(stat.name().unwrap_or(""), read_modes()) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Could not open storage {}: {}", name, e);
                    exit(1);
                }
            };

            list(&child, &format!("{}/", name), long, recursive);
        }
    }
}

fn main() {
    env_logger::init();

    let arguments = App::new("ls-docfile")
        .version("0.1.0")
        .about("This program lists the elements of a storage in a docfile.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile"),
        )
        .arg(
            Arg::with_name("storage")
                .required(false)
                .takes_value(true)
                .help("The storage to list, for example /a/b. Defaults to the root."),
        )
        .arg(
            Arg::with_name("list")
                .short("l")
                .required(false)
                .takes_value(false)
                .help("List the elements with their metadata."),
        )
        .arg(
            Arg::with_name("recursive")
                .short("r")
                .required(false)
                .takes_value(false)
                .help("Descend into storages."),
        )
        .get_matches();

    let path = match arguments.value_of("image") {
        Some(p) => p,
        None => {
            eprintln!("An image is required.");
            exit(1);
        }
    };

    let root = match open_docfile(path, read_modes()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            exit(1);
        }
    };

    let components = split_path(arguments.value_of("storage").unwrap_or("/"));
    let storage = match walk_storages(&root, &components, false) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Could not open storage: {}", e);
            exit(1);
        }
    };

    list(
        &storage,
        "",
        arguments.is_present("list"),
        arguments.is_present("recursive"),
    );
}
