use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("xbee {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: xbee");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("XBEE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("XBEE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "features: session={}, cli=true",
        cfg!(feature = "session")
    );
    println!("serial: serialport");
    println!("api_mode: 1 (unescaped)");

    Ok(SUCCESS)
}
