use bolex::{analyze_batch, EngineConfig, SatMethod};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let mut config = EngineConfig::default();
    config.sat.method = SatMethod::Dpll;
    config.sat.find_all = true;

    let texts = ["AB + AB' + A'B", "(A + B)(A' + C)", "A AND NOT A", "A + (B"];
    for (text, result) in texts.iter().zip(analyze_batch(&texts, &config)) {
        println!("----------------------------------");
        println!("expression: {}", text);
        let analysis = match result {
            Ok(analysis) => analysis,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };
        if let Some(s) = &analysis.simplification {
            println!("simplified = {}", s.simplified());
        }
        if let Some(best) = analysis.minimization.as_ref().and_then(|m| m.best()) {
            println!("minimized ({}) = {}", best.algorithm(), best.expression());
        }
        if let Some(sat) = &analysis.sat {
            println!("satisfiable = {}, solutions = {}", sat.satisfiable(), sat.solutions().len());
        }
        if let Some(pos) = &analysis.pos {
            println!("pos = {}", pos.minimized());
        }
        if let Some(circuit) = &analysis.circuit {
            print!("{}", circuit.verilog());
        }
        for failure in &analysis.failures {
            println!("{} failed: {}", failure.stage, failure.error);
        }
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
