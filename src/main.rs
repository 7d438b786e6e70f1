use clap::Parser;
use sqlusage_analysis::app;
use sqlusage_analysis::config::{clap_exit_code, Cli, Config};
use sqlusage_analysis::logging::{self, LogConfig};
use tracing::Level;

fn main() {
    // 解析失败按配置错误退出，不沿用 clap 的默认退出码
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(clap_exit_code(&e));
        }
    };

    let mut log_config = LogConfig::new();
    if cli.verbose {
        log_config = log_config.level(Level::DEBUG);
    }
    if cli.no_log_file {
        log_config = log_config.console_only();
    }
    logging::init_logging(log_config);

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    match app::run(&config) {
        Ok(summary) => {
            println!(
                "处理完成: 共 {} 个文件，失败 {} 个，耗时 {:.2?}，报表 => {}",
                summary.total_files,
                summary.failed_files,
                summary.elapsed,
                config.out_path.display()
            );
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
