use clap::Parser;
use foldcomp_rs::{FoldCompound, FoldOptions, FoldResult, ModelDetails};

/// Prepare the DP matrices for folding a sequence and report what was allocated
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The sequence, or several aligned sequences separated by commas
    #[arg()]
    seq: String,

    /// The temperature in celsius
    #[arg(short, long)]
    temp: Option<f64>,

    /// Prepare the partition function matrices
    #[arg(long)]
    pf: bool,

    /// Skip the MFE matrices
    #[arg(long)]
    no_mfe: bool,

    /// The RNA is circular
    #[arg(short, long)]
    circ: bool,

    /// First reference structure, switches to distance classes
    #[arg(long, requires = "ref2")]
    ref1: Option<String>,

    /// Second reference structure
    #[arg(long, requires = "ref1")]
    ref2: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    tracing::trace!("Starting");

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> FoldResult<()> {
    let mut md = ModelDetails::default().with_circ(args.circ);
    if let Some(temp) = args.temp {
        md = md.with_temperature(temp);
    }

    let mut options = FoldOptions::new();
    if !args.no_mfe {
        options = options.mfe();
    }
    if args.pf {
        options = options.pf();
    }

    let fc = match (&args.ref1, &args.ref2) {
        (Some(s1), Some(s2)) => FoldCompound::try_new_two_reference(
            args.seq.as_bytes(),
            s1.as_bytes(),
            s2.as_bytes(),
            &md,
            options,
        )?,
        _ if args.seq.contains(',') => {
            let rows: Vec<&str> = args.seq.split(',').collect();
            FoldCompound::try_new_alignment(&rows, &md, options)?
        }
        _ => FoldCompound::try_new(args.seq.as_bytes(), &md, options)?,
    };

    println!("length:  {}", fc.length());
    println!("n_seq:   {}", fc.n_seq());
    if let Some(cut) = fc.cutpoint() {
        println!("cut:     {cut}");
    }
    if let (Some(d1), Some(d2)) = (fc.max_d1(), fc.max_d2()) {
        println!("max_d:   {d1} {d2}");
    }
    if let Some(exp) = fc.exp_params() {
        println!("pf_scale {:.4}", exp.pf_scale);
    }
    println!("buffers: {}", fc.ledger().live());
    Ok(())
}
