use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: chordbar <input.mma> [output.mma]");
        eprintln!("       chordbar --tokens <input.mma>");
        eprintln!("       chordbar --markers <input.mma> [output.mma]");
        process::exit(1);
    }

    let mut tokens = false;
    let mut markers = false;
    let mut input_path = &args[1];
    let mut output_path: Option<&String> = args.get(2);

    // Parse flags
    if args[1] == "--tokens" || args[1] == "--markers" {
        tokens = args[1] == "--tokens";
        markers = args[1] == "--markers";
        if args.len() < 3 {
            eprintln!("Usage: chordbar {} <input.mma> [output.mma]", args[1]);
            process::exit(1);
        }
        input_path = &args[2];
        output_path = args.get(3);
    }

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    // Parse
    let song = match chordbar::parse(&source) {
        Ok(song) => song,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    };

    let output = if tokens {
        match serde_yaml::to_string(&song) {
            Ok(yaml) => yaml,
            Err(e) => {
                eprintln!("Error serializing tokens: {}", e);
                process::exit(1);
            }
        }
    } else if markers {
        song.write_to_string_with_markers()
    } else {
        song.write_to_string()
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &output) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote {}", path);
        }
        None => {
            print!("{}", output);
        }
    }
}
