// Dot directories are never traversed.
