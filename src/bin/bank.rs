//! 银行排队仿真
//!
//! 运行单柜员银行模型并以 JSON 输出等待队列统计

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use procsim_rs::demo::{BankConfig, run_bank};
use procsim_rs::queue::QueueOrder;
use procsim_rs::sim::{Environment, EnvironmentConfig, JsonLinesTrace};

#[derive(Debug, Parser)]
#[command(name = "bank", about = "银行排队仿真：顾客到达、排队、柜员服务")]
struct Args {
    /// JSON 格式的银行配置文件路径
    #[arg(long)]
    config: Option<PathBuf>,

    /// 仿真运行到该时间
    #[arg(long)]
    until: Option<f64>,

    /// 到达间隔的随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 柜员数量
    #[arg(long)]
    clerks: Option<usize>,

    /// 按优先级而非 FIFO 服务等待队列
    #[arg(long)]
    priority_queue: bool,

    /// 把每个仿真事件按行写成 JSON 对象
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

fn main() {
    // 初始化 tracing（日志写到 stderr，stdout 留给 JSON 结果）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => BankConfig::from_json_file(path).expect("load bank config"),
        None => BankConfig::default(),
    };
    if let Some(until) = args.until {
        cfg.until = until;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if let Some(clerks) = args.clerks {
        cfg.clerks = clerks;
    }
    if args.priority_queue {
        cfg.queue_order = QueueOrder::Priority;
    }

    let mut env = Environment::new(EnvironmentConfig::default());
    if let Some(path) = &args.trace_json {
        let file = File::create(path).expect("create trace file");
        env.add_listener(JsonLinesTrace::new(BufWriter::new(file)));
    }

    let report = match run_bank(&mut env, &cfg) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("bank simulation failed: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).expect("serialize report")
    );
}
