use std::error::Error;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use content_indexer::{generate_snapshot, IndexerError, IndexerOptions};
use journal_filter::DEFAULT_PAGE_SIZE;

fn main() {
    // 设置命令行参数
    let matches = Command::new("内容快照生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("把CMS导出数据生成日志页使用的内容快照")
        .arg(Arg::new("source")
            .short('s')
            .long("source")
            .value_name("SOURCE")
            .help("导出文件或目录路径（.ndjson / .json）")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("OUTPUT_DIR")
            .help("快照输出目录路径")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("page_size")
            .long("page-size")
            .value_name("N")
            .help("每页文章数，用于汇总首页页数")
            .value_parser(value_parser!(usize))
            .default_value("9"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
        .get_matches();

    let verbose = matches.get_flag("verbose");
    init_tracing(verbose);

    // required 参数由clap保证存在
    let (Some(source), Some(output)) = (
        matches.get_one::<PathBuf>("source"),
        matches.get_one::<PathBuf>("output"),
    ) else {
        error!("缺少 --source 或 --output 参数");
        std::process::exit(1);
    };

    let mut options = IndexerOptions::new(source, output);
    options.page_size = matches
        .get_one::<usize>("page_size")
        .copied()
        .unwrap_or(DEFAULT_PAGE_SIZE);
    options.verbose = verbose;

    info!("源: {}", options.source.display());
    info!("输出目录: {}", options.output.display());

    match generate_snapshot(&options) {
        Ok(report) => {
            info!(
                posts = report.posts,
                tags = report.tags,
                services = report.services,
                portfolio = report.has_portfolio,
                total_pages = report.total_pages,
                bytes = report.bytes,
                "快照已生成: {}",
                report.output.display()
            );
        }
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn report_error(e: &IndexerError) {
    error!("快照生成失败: {}", e);
    if let IndexerError::Content(errors) = e {
        for content_error in errors {
            error!("  {}", content_error);
        }
    }

    let mut source = e.source();
    while let Some(cause) = source {
        error!("  原因: {}", cause);
        source = cause.source();
    }
}
