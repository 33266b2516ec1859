use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use filter_resolver::alias::AliasRegistry;
use filter_resolver::catalog::StaticCatalog;
use filter_resolver::config::CatalogConfig;
use filter_resolver::parser::Parser;
use filter_resolver::sql_compiler::FilterCompiler;

const DEFAULT_CONFIG: &str = "catalog.json";

const HELP: &str = "\
命令:
  alias <名称> <关联路径>   注册别名, 例如: alias m manufacturer
  main <名称>               设置主实体别名
  aliases                   显示当前别名
  clear                     清空别名
  entity <实体名>           切换根实体
  help                      显示帮助
  quit                      退出
其他输入按过滤表达式解析, 例如: stock > 10 AND m.name LIKE 'A%'";

/// REPL 会话状态
struct Session {
    config: CatalogConfig,
    catalog: StaticCatalog,
    aliases: AliasRegistry,
    root: String,
    parser: Parser,
}

impl Session {
    fn handle(&mut self, line: &str) -> Result<()> {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("help"), None, None) => println!("{HELP}"),
            (Some("alias"), Some(alias), Some(path)) => {
                self.aliases.register(alias, path)?;
                println!("✅ {alias} -> {path}");
            }
            (Some("main"), Some(alias), None) => {
                self.aliases.set_main_alias(alias)?;
                println!("✅ 主实体别名: {alias}");
            }
            (Some("aliases"), None, None) => self.print_aliases(),
            (Some("clear"), None, None) => {
                self.aliases.clear();
                println!("✅ 已清空别名");
            }
            (Some("entity"), Some(entity), None) => {
                if !self.catalog.contains(entity) {
                    anyhow::bail!("未知实体: {entity}");
                }
                self.root = entity.to_string();
                println!("✅ 根实体: {entity}");
            }
            _ => self.evaluate(line)?,
        }
        Ok(())
    }

    fn evaluate(&self, expression: &str) -> Result<()> {
        let parsed = self.parser.parse(expression)?;
        println!("[解析结果]:\n{}", serde_json::to_string_pretty(&parsed)?);

        let compiler = FilterCompiler::from_config(&self.catalog, &self.aliases, &self.config);
        let compiled = compiler.compile(&self.root, &parsed)?;
        println!("[字段路径]:");
        for resolved in &compiled.resolved {
            println!("  {} -> {} ({:?})", resolved.original, resolved.path, resolved.kind);
        }
        println!("[生成的 SQL]:\n{}", compiled.sql);
        Ok(())
    }

    fn print_aliases(&self) {
        match self.aliases.main_alias() {
            Some(main) => println!("主实体别名: {main}"),
            None => println!("主实体别名: (未设置)"),
        }
        let mut aliases: Vec<_> = self.aliases.aliases().collect();
        aliases.sort_unstable();
        for (alias, path) in aliases {
            println!("  {alias} -> {path}");
        }
    }
}

fn load_config(path: &str) -> CatalogConfig {
    match CatalogConfig::from_json_file(path) {
        Ok(config) => {
            println!("✅ 使用JSON配置文件: {path}");
            println!("✅ 加载了 {} 个实体定义", config.entities.len());
            config
        }
        Err(e) => {
            println!("⚠️ {e}, 使用空配置");
            CatalogConfig::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!("--- Filter Resolver: 过滤表达式与路径解析 ---");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = load_config(&config_path);
    let catalog = config.catalog();

    let root = match args.next() {
        Some(entity) => entity,
        None => {
            let mut names: Vec<_> = catalog.entity_names().collect();
            names.sort_unstable();
            names.first().map(|s| s.to_string()).unwrap_or_default()
        }
    };
    println!("根实体: {root}\n输入 help 查看命令");

    let mut session = Session {
        config,
        catalog,
        aliases: AliasRegistry::new(),
        root,
        parser: Parser::new(),
    };

    let mut editor = DefaultEditor::new().context("无法初始化行编辑器")?;
    loop {
        match editor.readline("filter> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                if matches!(line, "quit" | "exit") {
                    break;
                }
                if let Err(e) = session.handle(line) {
                    println!("✗ {e}");
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
