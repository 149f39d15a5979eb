//! Backends command

use anyhow::Result;

use super::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let device = super::accelerator();
    print!("{}", gifpar_compute::describe_backends(device.as_ref()));
    if settings.verbose > 0 {
        println!("rayon threads: {}", rayon::current_num_threads());
        println!("world size: {}", settings.world_size);
    }
    Ok(())
}
