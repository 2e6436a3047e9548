// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Entry point to the user management service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::error;
use std::env;
use std::net::Ipv4Addr;
use std::process;
use std::sync::Arc;
use usrmgr_authn::driver::AuthnOptions;
use usrmgr_core::db::mysql::{MySqlDb, MySqlOptions};
use usrmgr_server::serve;

/// Port to listen on when `PORT` is not set.
const DEFAULT_PORT: u16 = 4000;

/// Reads the configuration from the environment and runs the server until it fails.
async fn run() -> Result<(), String> {
    let port = match env::var("PORT") {
        Ok(val) => val.parse::<u16>().map_err(|e| format!("Invalid PORT {}: {}", val, e))?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = (Ipv4Addr::UNSPECIFIED, port);

    let db_opts = MySqlOptions::from_env("DB")?;
    let authn_opts = AuthnOptions::from_env("JWT")?;

    let db = Arc::from(MySqlDb::connect(db_opts).map_err(|e| e.to_string())?);
    serve(addr, db, authn_opts).await.map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("usrmgr: {}", e);
        process::exit(1);
    }
}
