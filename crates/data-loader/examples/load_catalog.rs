use data_loader::GameIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/games.json");

    println!("Loading Steam game catalog...\n");

    let start = Instant::now();
    let index = GameIndex::load_from_file(path)
        .expect("Failed to load catalog");
    let elapsed = start.elapsed();

    let priced = index.iter().filter(|g| g.price_cents.is_some()).count();
    let multiplayer = index.iter().filter(|g| g.is_multiplayer()).count();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Games: {}", index.len());
    println!("Priced: {}", priced);
    println!("Multiplayer: {}", multiplayer);
    println!("\nPerformance: {:.0} games/second",
             index.len() as f64 / elapsed.as_secs_f64());
}
