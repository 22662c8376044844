/// Bundles the plugin via nih_plug_xtask:
///
///   cargo xtask bundle neuronic-glitch --release
///
/// The bundles land in `target/bundled/` (`Neuronic Glitch.vst3` and
/// `Neuronic Glitch.clap`).
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
