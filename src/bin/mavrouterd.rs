use std::env;
use std::process::ExitCode;

use mavrouter::dialect::common::MavMessage;
use mavrouter::{Router, RouterConfig, RouterError};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        eprintln!("Usage: mavrouterd <dialect> <system-id> <component-id> <connection>...");
        eprintln!("  dialect:     common");
        eprintln!("  connection:  udpin:<ip>:<port> | udpout:<ip>:<port> | tcpout:<ip>:<port> | serial:<device>:<baud>");
        return ExitCode::from(2);
    }

    let dialect = args[1].clone();
    let (Ok(system_id), Ok(component_id)) = (args[2].parse::<u8>(), args[3].parse::<u8>()) else {
        eprintln!("mavrouterd: system-id and component-id must be 0-255");
        return ExitCode::from(2);
    };
    let config = RouterConfig {
        system_id,
        component_id,
        connections: args[4..].to_vec(),
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("mavrouterd: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let started = match dialect.as_str() {
            "common" => Router::<MavMessage>::start(config),
            _ => Err(RouterError::NoDialectSet),
        };
        match started {
            Ok(handle) => {
                let _ = tokio::signal::ctrl_c().await;
                handle.shutdown().await;
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("mavrouterd: {e}");
                ExitCode::FAILURE
            }
        }
    })
}
