use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("spwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: spwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SPWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("sp_version: 0");
    println!(
        "max_message_size: {}",
        spwire::pipe::DEFAULT_MAX_MESSAGE_SIZE
    );
    println!("transports: {}", transports());

    Ok(SUCCESS)
}

fn transports() -> &'static str {
    if cfg!(unix) {
        "tcp, ipc"
    } else {
        "tcp"
    }
}
