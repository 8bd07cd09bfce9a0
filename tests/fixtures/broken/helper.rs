// Never reached.
