fn main() -> anyhow::Result<()> {
    keypad_cues_lib::run()
}
