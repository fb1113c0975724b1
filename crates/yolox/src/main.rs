use anyhow::Context;
use std::io::{self, BufWriter, Write};
use yolox::{
    AppConfig, ProposalDecoder, crop_input_dims, generate_grid, load_table_from_path,
    logging::setup_logging, read_tensor, select_labeled,
};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let (width, height) =
        crop_input_dims(config.input_size.0, config.input_size.1, &config.decoder.strides);
    let grid = generate_grid(&config.decoder.strides, height, width);
    tracing::info!(width, height, anchors = grid.len(), "Anchor grid ready");

    let table = load_table_from_path(&config.colormap_path);

    let output = read_tensor(&config.tensor_path)
        .with_context(|| format!("Failed to read tensor {}", config.tensor_path))?;
    let decoder = ProposalDecoder::new(config.decoder.clone())?;
    let proposals = decoder
        .decode(&output, &grid)
        .with_context(|| format!("Failed to decode {}", config.tensor_path))?;

    // Suppression happens downstream; keep the top-ranked proposals as they are.
    let indices: Vec<usize> = (0..proposals.len().min(config.max_detections)).collect();
    let labeled = select_labeled(&proposals, &indices, &table)?;

    tracing::info!(
        proposals = proposals.len(),
        selected = labeled.len(),
        "Decoding complete"
    );

    let mut stdout = BufWriter::new(io::stdout().lock());
    for detection in &labeled {
        serde_json::to_writer(&mut stdout, detection)?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;

    Ok(())
}
