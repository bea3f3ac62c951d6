use wakeboard::wol;

use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        eprintln!("usage: wakecli <mac> [broadcast] [port]");
        process::exit(2);
    }

    let broadcast = args.get(2).map(|s| s.as_str());
    let port = match args.get(3) {
        Some(p) => match p.parse() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("bad port: {}", p);
                process::exit(2);
            }
        },
        None => 0,
    };

    match wol::wake(&args[1], broadcast, port) {
        Ok(mac) => println!("magic packet sent for {}", mac),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
