use huffstream::{HuffmanCodec, SymbolDistribution};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let english = SymbolDistribution::english_letters();
    let codec = HuffmanCodec::new(english.weights.clone(), &english.symbols)?;

    println!("Code book ({} symbols):", codec.vocabulary_size());
    let mut entries: Vec<(u8, String)> = codec.code_book().into_iter().collect();
    entries.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.1.cmp(&b.1)));
    for (symbol, code) in &entries {
        let weight = english.weights[(symbol - b'a') as usize];
        println!("  {}: {:>7.5}  {}", *symbol as char, weight, code);
    }
    println!("  ESC:          {}", codec.escape_code());
    println!("Tree (leaf #26 is the escape symbol):\n{}", codec.tree());

    let sample_text = "the quick brown fox jumps over the lazy dog, twice!";
    let mut encoded = Vec::new();
    codec.encode(sample_text.as_bytes(), &mut encoded)?;

    println!(
        "Encoded {} bytes into {} bytes ({:.1}% of original)",
        sample_text.len(),
        encoded.len(),
        encoded.len() as f64 / sample_text.len() as f64 * 100.0
    );

    // A code fitted to the text itself, so nothing needs escaping.
    let fitted = SymbolDistribution::from_sample(sample_text.as_bytes());
    let fitted_codec = HuffmanCodec::new(fitted.weights, fitted.symbols)?;
    let fitted_encoded = fitted_codec.encode_bytes(sample_text.as_bytes())?;
    println!("With a fitted code book: {} bytes", fitted_encoded.len());

    Ok(())
}
