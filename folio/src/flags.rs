use std::path::PathBuf;

xflags::xflags! {
    /// Build a static HTML site from a tree of Markdown notes.
    cmd folio {
        /// Directory holding the Markdown sources. Defaults to the configured
        /// source root.
        optional source: PathBuf
        /// Directory the site is written to.
        optional -o, --output dir: PathBuf
        /// Configuration file. Defaults to `folio.toml` in the source
        /// directory or the current directory, if present.
        optional -c, --config file: PathBuf
        /// A file or directory name to leave out. Repeatable.
        repeated -x, --exclude name: String
        /// A Markdown extension to enable. Repeatable.
        repeated -e, --extension name: String
        /// Page layout: `plain` or `navbar`.
        optional -t, --template name: String
        /// Stamp every page with the build time.
        optional --timestamp
        /// Log progress at `info` level.
        optional -v, --verbose
    }
}
