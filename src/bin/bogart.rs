// Copyright 2026 The Bogart Authors.
// Licensed under the GNU General Public License v3.0
// (https://opensource.org/licenses/GPL-3.0). This file may not be
// copied, modified, or distributed except according to those terms.

use std::process::exit;

use structopt::StructOpt;

use bogart::cli::{run, Bogart};
use bogart::logging;

pub fn main() {
    let opt = Bogart::from_args();

    if let Err(e) = logging::init(opt.verbose) {
        eprintln!("failed to initialize logging: {}", e);
        exit(2);
    }

    exit(match run(opt) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    })
}
