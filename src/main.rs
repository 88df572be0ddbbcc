//! CI Deploy Gateway - GitOps 个性化部署网关
//!
//! Usage:
//! - Normal mode: `ci-deploy-gateway`
//! - With custom port: `ci-deploy-gateway --port 9000`

use ci_deploy_gateway::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("CI Deploy Gateway - GitOps 个性化部署网关");
    println!();
    println!("USAGE:");
    println!("    ci-deploy-gateway [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port");
    println!("    -h, --help       Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    CIRCLECI_TOKEN   CI provider API token");
    println!("    GITHUB_USERNAME  Repository owner");
    println!("    REPO_NAME        Repository name (default: gitops)");
    println!("    PORT             Listening port (default: 8000)");
}

#[tokio::main]
async fn main() {
    let config = parse_args();

    if let Err(e) = ci_deploy_gateway::init_and_run_with_config(config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
