//! Example: walk two pages forward with each engine, then jump back to page 1.

use ksk::{Backend, BackendConfig, Page, Registry};

fn print_page(engine: &str, page: &Page) {
    println!(
        "[{}] page {} - {} results{}",
        engine,
        page.page_num,
        page.len(),
        if page.has_more { " (more available)" } else { "" }
    );
    for (i, result) in page.items().iter().take(5).enumerate() {
        println!("{}. {}", i + 1, result.title);
        println!("   URL: {}", result.url);
    }
    println!();
}

async fn walk(backend: &dyn Backend, query: &str) -> anyhow::Result<()> {
    let first = backend.search(query).await?;
    print_page(backend.name(), &first);

    if !first.has_more {
        return Ok(());
    }
    let second = backend.next_page(&first, query).await?;
    print_page(backend.name(), &second);

    let back = backend.prev_page(query, 1).await?;
    println!("[{}] back on page {}\n", backend.name(), back.page_num);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let registry = Registry::with_defaults();
    let query = "rust programming language";
    println!("Searching for: {}\n", query);

    for name in registry.names() {
        let backend = registry.create(name, BackendConfig::new().with_region("us"))?;
        if let Err(e) = walk(backend.as_ref(), query).await {
            println!("[{}] failed: {}\n", name, e);
        }
    }

    Ok(())
}
