// Not scanned: dot-prefixed directories are skipped.
