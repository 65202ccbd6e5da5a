//! Fill in icon font code points in a small build pass.
//!
//! The style sheet is a plain text module, so it is rewritten outright.
//! The script module is patchable, so it receives range edits on its original value.
use replace_holder::pipeline::{Replacer, ReplacerConfig, ReplacerOptions};
use replace_holder::source::{BuildPass, SourceRecord};
use replace_holder::{DataMapping, Replacement};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let config = ReplacerConfig::new(ReplacerOptions {
		pattern: r"ICON_FONT\(([^)]*)\)".into(),
		module_mark: Some("iconFontModule".into()),
		output: "fonts/".into(),
		..Default::default()
	})?;
	let replacer = Replacer::new(config);

	let mut data = DataMapping::new();
	data.insert("home".into(), Replacement::new("\u{e001}", "\\e001"));
	data.insert("search".into(), Replacement::new("\u{e002}", "\\e002"));

	let mut pass = BuildPass::new(vec![
		SourceRecord::plain(
			"css ./src/icons.css",
			".icon-home::before { content: 'ICON_FONT(home)'; }\n.icon-search::before { content: 'ICON_FONT(search)'; }\n",
		),
		SourceRecord::patchable("./src/icons.js", "export const icons = { home: 'ICON_FONT(home)', close: 'ICON_FONT(close)' };\n")
			.with_mark("iconFontModule"),
		SourceRecord::patchable("./src/app.js", "console.log('ICON_FONT(home) is left alone here');\n"),
	]);

	let summary = replacer.run(&mut pass, &data)?;
	println!("{summary:#?}");
	println!();

	for record in &pass.modules {
		println!("// {}", record.identifier);
		print!("{}", record.payload.render()?);
	}
	println!();

	let font = b"wOF2 font data";
	let file_name = replacer.config().file_name_for_content(font, &[("name", "icons"), ("ext", "woff2")]);
	println!("font file: {}", replacer.config().file_url(&file_name, "https://cdn.example.com/assets/"));

	Ok(())
}
