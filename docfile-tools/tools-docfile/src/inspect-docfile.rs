use clap::{App, Arg};
use docfile::{BLOCK_END_OF_CHAIN, BLOCK_UNUSED};
use docfile_tool_lib::{open_docfile, read_modes, u64_to_sized_string};
use std::process::exit;

const BYTES_PER_LINE: usize = 16;

fn block_name(block: u32) -> String {
    return match block {
        BLOCK_UNUSED => String::from("unused"),
        BLOCK_END_OF_CHAIN => String::from("end of chain"),
        b => format!("{}", b),
    };
}

fn main() {
    env_logger::init();

    let arguments = App::new("inspect-docfile")
        .version("0.1.0")
        .about("This program prints the header and allocation statistics of a docfile.")
        .arg(
            Arg::with_name("image")
                .required(true)
                .takes_value(true)
                .help("The path of the docfile"),
        )
        .arg(
            Arg::with_name("block")
                .short("b")
                .long("block")
                .takes_value(true)
                .help("Hex dump this big block."),
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
            eprintln!("Docfile opening error: {}", e);
            exit(1);
        }
    };

    if let Some(block) = arguments.value_of("block") {
        let index = match block.parse::<u32>() {
            Ok(i) => i,
            Err(_) => {
                eprintln!("\"{}\" is not a block number.", block);
                exit(1);
            }
        };

        let contents = match root.read_block(index) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Could not read block {}: {}", index, e);
                exit(1);
            }
        };

        for (line, chunk) in contents.chunks(BYTES_PER_LINE).enumerate() {
            println!("{:08x}  {}", line * BYTES_PER_LINE, hex::encode(chunk));
        }

        return;
    }

    let header = root.header();
    let info = match root.disk_info() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Could not scan the docfile: {}", e);
            exit(1);
        }
    };

    println!("Big block size:        {}", info.big_block_size());
    println!("Small block size:      {}", info.small_block_size());
    println!("Directory start:       {}", block_name(header.root_start_block));
    println!("Mini table start:      {}", block_name(header.small_block_depot_start));
    println!("Table blocks:          {}", info.depot_block_count());
    println!(
        "Extended table:        {} blocks from {}",
        info.ext_depot_block_count(),
        block_name(header.ext_big_block_depot_start)
    );
    println!(
        "Big blocks:            {} ({} free)",
        info.big_block_count(),
        info.free_big_block_count()
    );
    println!(
        "Small blocks:          {} ({} free)",
        info.small_block_count(),
        info.free_small_block_count()
    );
    println!(
        "Directory records:     {} ({} free)",
        info.entry_count(),
        info.free_entry_count()
    );
    println!(
        "Free space:            {}",
        u64_to_sized_string(info.free_space())
    );
}
