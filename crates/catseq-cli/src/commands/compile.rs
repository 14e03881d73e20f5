use catseq_core::{CompileOptions, CostTable, Cycles, NullOracle, TableOracle, compile, demo};

pub struct CompileCommandConfig<'a> {
    pub scenario: &'a str,
    pub no_pipelining: bool,
    pub calibrated: bool,
    pub output: Option<&'a str>,
}

pub fn run(config: CompileCommandConfig<'_>) {
    let morphism = match demo::build(config.scenario) {
        Ok(m) => m,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let options = if config.no_pipelining {
        CompileOptions::fast()
    } else {
        CompileOptions::default()
    };

    let table_oracle;
    let null_oracle = NullOracle;
    let oracle: &dyn catseq_core::CostOracle = if config.calibrated {
        let mut table = CostTable::with_default(Cycles(50));
        table.set(catseq_core::OpCode::WfLoadCoeffs, Cycles(2_000));
        table.set(catseq_core::OpCode::TtlInit, Cycles(10));
        table_oracle = TableOracle::new(table);
        &table_oracle
    } else {
        &null_oracle
    };

    match compile(&morphism, oracle, &options) {
        Ok(plan) => {
            log::info!(
                "compiled scenario '{}' into {} board stream(s)",
                config.scenario,
                plan.len()
            );
            let mut boards = serde_json::Map::new();
            for (board, instructions) in &plan {
                let list: Vec<_> = instructions.iter().map(|i| i.to_json()).collect();
                boards.insert(board.name(), serde_json::Value::Array(list));
            }
            let json = serde_json::Value::Object(boards);
            let rendered = serde_json::to_string_pretty(&json).expect("json serialisation cannot fail here");
            match config.output {
                Some(path) => {
                    if let Err(err) = std::fs::write(path, &rendered) {
                        log::error!("failed to write {path}: {err}");
                        eprintln!("error writing {path}: {err}");
                        std::process::exit(1);
                    }
                }
                None => println!("{rendered}"),
            }
        }
        Err(err) => {
            log::error!("compile failed: {err}");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
